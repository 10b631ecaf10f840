//! # wireform - bidirectional configuration/wire conversion
//!
//! For CLI usage see the repository README.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `wireform` works internally.
//!
//! ### The two tree shapes
//!
//! A resource definition exists in two representations, both modeled as a
//! [value::Value] tree:
//!
//! - **human form**: what the author writes. snake_case keys; an optional
//!   settings block is a sequence containing at most one mapping (so the
//!   block can be absent, `[]`, or present, `[{...}]`)
//! - **wire form**: what the remote resource-management API speaks. camelCase
//!   keys; blocks are bare mappings; discriminated unions carry an explicit
//!   `type` tag
//!
//! This is a valid resource file:
//! ```hcl
//! dataset "sales" {
//!   name = "sales"
//!
//!   include_location {
//!     datastore = "ds1"
//!
//!     relational_location {
//!       db     = "sales"
//!       schema = "public"
//!     }
//!   }
//! }
//! ```
//!
//! ### Loading files
//!
//! An `.rc.hcl` document is parsed as a `body` ([hcl_edit::structure::Body]).
//! [documents::ResourceDocuments] stores all root attributes and blocks of all
//! documents and tracks their original source path so error messages can point
//! at it. [documents::ResourceSet::new] then applies the resource-specific
//! rules (known family, exactly one name label, no collisions) and converts
//! each block body into a human form tree. Nested HCL blocks become sequences
//! of mappings - the human block shape falls out of the syntax for free.
//!
//! ### Conversion
//!
//! see [convert::to_wire_form] and [convert::to_human_form]
//!
//! The converter walks the tree and renames keys through the per-family
//! [registry::Registry]. A registry attaches special handling to a few keys:
//!
//! - location lists go through [legacy] (deprecated flat spelling vs current
//!   nested spelling, both encoding to one canonical wire shape) and
//!   [location] (five mutually exclusive variant sub-blocks, resolved into a
//!   tagged [location::GenericLocation])
//! - identity lists go through [identity] (four variants; the value lives in
//!   `name` or `group_id` depending on the kind)
//! - the custom policy block goes through [policy] on decode, which suppresses
//!   a block that is semantically "never configured"
//!
//! Everything is a pure function over in-memory trees. Decoding takes the
//! previously stored human form as an explicit parameter where it matters
//! (legacy spelling stickiness); there is no ambient state anywhere.
//!
//! ### Errors
//!
//! All conversion failures are [error::ConvertError] values: deterministic,
//! fail-fast, never guessed around. See that module for the catalogue.
pub mod convert;
pub mod documents;
pub mod error;
pub mod identity;
pub mod legacy;
pub mod location;
pub mod policy;
pub mod registry;
pub mod value;
