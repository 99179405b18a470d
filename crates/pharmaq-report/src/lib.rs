//! Report generation and export.
//!
//! - [`builder`]: asks every question template about one society and
//!   assembles the answers into a report row
//! - [`spreadsheet`]: serializes the report table to an xlsx workbook
//! - [`html`]: renders the report table and the email letter as HTML
//! - [`email`]: sends the rendered report through an SMTP relay

pub mod builder;
pub mod email;
pub mod error;
pub mod html;
pub mod spreadsheet;

pub use builder::{QuestionFailure, ReportBuild, ReportBuilder};
pub use email::{
    EmailExporter, EmailRequest, EmailStatus, EnvSecretResolver, Mailer, OutgoingEmail,
    SecretRef, SecretResolver, SmtpMailer, SmtpSecurity,
};
pub use error::{EmailError, ReportError};
