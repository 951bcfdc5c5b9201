//! # wu_util
//!
//! Small stateless helpers shared by front-end tooling: random integers,
//! point distance, pseudo UUIDs and style-attribute observation.

pub mod geometry;
pub mod id;
pub mod observer;
pub mod random;

pub use geometry::point_distance;
pub use id::pseudo_uuid;
pub use id::pseudo_uuid_with;
pub use observer::Element;
pub use observer::MutationRecord;
pub use observer::MutationTarget;
pub use observer::ObserveOptions;
pub use observer::Observer;
pub use observer::observe_style_changes;
pub use random::random_int;
pub use random::random_int_with;
pub use random::random_up_to;
pub use random::random_up_to_with;
