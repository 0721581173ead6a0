pub mod reviewdtos;
pub mod verificationdtos;
pub mod workerdtos;
