//! # Approval testing toolbox
//!
//! > Review the output once, then keep it from drifting
//!
//! `approvalbox` is for when:
//! - The value under test is too large to spell out in an assertion
//! - You want to read the expected value as a file next to your test
//! - You need deep comparison of nested values with a few fields left out or
//!   checked differently
//!
#![cfg_attr(feature = "document-features", doc = document_features::document_features!())]
//!
//! # Examples
//!
//! [`same_json_as_approved`] compares a value's JSON rendering against
//! `approved/<module>/<test>-approved.json`.  The first run writes
//! `<test>-not-approved.json` and fails; review it and rename it to approve.
//! ```rust,no_run
//! use approvalbox::{assert_that, same_json_as_approved, test_identity};
//!
//! #[derive(serde::Serialize)]
//! struct Invoice { number: u32, lines: Vec<String>, issued_at: String }
//!
//! #[test]
//! fn renders_invoice() {
//!     let invoice = Invoice { number: 1, lines: vec!["apple".into()], issued_at: "now".into() };
//!     assert_that(
//!         &invoice,
//!         same_json_as_approved()
//!             .identity(test_identity!())
//!             .ignoring("issued_at"),
//!     );
//! }
//! ```
//!
//! [`same_bean_as`] for deep comparison in memory:
//! ```rust
//! use approvalbox::{assert_that, equal_to, same_bean_as};
//!
//! #[derive(serde::Serialize)]
//! struct Child { name: String, age: u8 }
//!
//! let expected = Child { name: "apple".into(), age: 3 };
//! let actual = Child { name: "kiwi".into(), age: 3 };
//! assert_that(&actual, same_bean_as(&expected).with("name", equal_to("kiwi")));
//! ```
//!
//! Set `APPROVALS=overwrite` to accept the current output of every approval
//! assertion, see [`Action`].

mod action;
mod approval;
mod assert;
mod bean;
mod error;
mod identity;
mod matcher;

#[doc(hidden)]
pub mod macros;
pub mod report;
pub mod store;
pub mod tree;
pub mod utils;

pub use action::Action;
pub use action::DEFAULT_ACTION_ENV;
pub use approval::same_content_as_approved;
pub use approval::same_json_as_approved;
pub use approval::Approval;
pub use approval::Content;
pub use approval::Json;
pub use approval::SameContentAsApproved;
pub use approval::SameJsonAsApproved;
pub use assert::assert_err;
pub use assert::assert_panics;
pub use assert::assert_that;
pub use assert::assert_that_with_reason;
pub use assert::try_assert_panics;
pub use assert::try_assert_that;
pub use assert::Assert;
pub use bean::same_bean_as;
pub use bean::SameBeanAs;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;
pub use identity::TestIdentity;
pub use matcher::contains_str;
pub use matcher::describe_value;
pub use matcher::ends_with;
pub use matcher::equal_to;
pub use matcher::has_message;
pub use matcher::matcher_fn;
pub use matcher::starts_with;
pub use matcher::EqualTo;
pub use matcher::FnMatcher;
pub use matcher::HasMessage;
pub use matcher::Matcher;
pub use matcher::MismatchReport;
pub use matcher::StrMatcher;
pub use matcher::Verdict;
