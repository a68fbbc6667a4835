use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const IPV4_ADDR: Color = Color::BrightCyan;

pub const LOC_DNS: Color = Color::BrightMagenta;
pub const LOC_FIREWALL: Color = Color::BrightRed;
pub const LOC_ROUTER: Color = Color::BrightBlue;
pub const LOC_DESTINATION: Color = Color::BrightGreen;
pub const LOC_GATEWAY: Color = Color::BrightYellow;
