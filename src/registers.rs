//! Register IDs for FT5316

macro_rules! register_id {
    ($name:ident, $addr:literal) => {
        $crate::paste::paste! {
            pub const [<$name:upper>]: u8 = $addr;
        }
    };
}

register_id!(DEVICE_MODE, 0x00);
register_id!(GESTURE_ID, 0x01);
register_id!(TOUCH_STATUS, 0x02);
register_id!(TOUCH_XH, 0x03);
register_id!(TOUCH_XL, 0x04);
register_id!(TOUCH_YH, 0x05);
register_id!(TOUCH_YL, 0x06);
register_id!(TOUCH_WEIGHT, 0x07);
register_id!(TOUCH_MISC, 0x08);
register_id!(CHIP_ID, 0xA3);
register_id!(G_MODE, 0xA4);
register_id!(FIRMWARE_ID, 0xA6);
register_id!(VENDOR_ID, 0xA8);

/// Value of `DEVICE_MODE` for normal operation
pub const DEVICE_MODE_WORKING: u8 = 0x00;

/// Size of one contact's register block on FT5x06-family parts
pub const CONTACT_STRIDE: u8 = 6;
