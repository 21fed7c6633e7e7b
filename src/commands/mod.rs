//! Command implementations for the draftmark CLI

pub mod assignment;
pub mod dispatch;
pub mod grade;
pub mod init;
pub mod student;
pub mod submit;
pub mod template;
pub mod version;
