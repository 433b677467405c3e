//! # Router Module
//!
//! Matches request paths against the route table built by the
//! [`RouteResolver`](crate::config::RouteResolver).
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling route patterns once when the table is built
//! - Matching incoming request paths in table order
//! - Returning the matched action and form type names
//!
//! ## Matching
//!
//! Every pattern is a regular expression that must match the whole path;
//! `/login\.do` matches `/login.do` but not `/app/login.do`. The first
//! matching entry in insertion order wins.
//!
//! ```rust
//! use actionroute::router::{RouteEntry, RouteTable};
//!
//! let table = RouteTable::new(vec![
//!     RouteEntry::new(r"/login\.do", "shop.web.LoginAction", "shop.web.LoginForm"),
//! ]).unwrap();
//!
//! let m = table.match_path("/login.do").unwrap();
//! assert_eq!(m.action_type(), "shop.web.LoginAction");
//! assert!(table.match_path("/logout.do").is_none());
//! ```

mod core;

pub use self::core::{RouteEntry, RouteMatch, RouteTable};
