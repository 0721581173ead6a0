pub mod outboxmodels;
pub mod reviewmodels;
pub mod verificationmodels;
pub mod workermodel;
