// SPDX-License-Identifier: MIT

//! Database entities (sea-orm).

pub mod arena;
pub mod image;
pub mod team;
pub mod user;
pub mod visit;

pub mod prelude {
    pub use super::arena::Entity as Arena;
    pub use super::image::Entity as Image;
    pub use super::team::Entity as Team;
    pub use super::user::Entity as User;
    pub use super::visit::Entity as Visit;
}
