//! Identifiers of the R4 controller board and its boot loader.

pub const FDD_VID: u16 = 0x19EC;
pub const R4_HID_PID: u16 = 0x0301;
pub const R4_WINUSB_PID: u16 = 0x0403;
pub const R4_WINUSB_GUID: &str = "54ED7AC9-CC23-4165-BE32-79016BAFB950";
pub const R4_RS232_BAUDRATE: u32 = 115200;

/// SAM-BA boot loader of the on-board Atmel microcontroller.
pub const ATMEL_VID: u16 = 0x03EB;
pub const ATMEL_SAM_BA_PID: u16 = 0x6124;
pub const ATMEL_SAM_BA_BAUDRATE: u32 = 115200;
