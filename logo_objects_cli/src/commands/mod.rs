//! CLI subcommand implementations.

use clap::ValueEnum;

/// Resources the CLI knows how to address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Resource {
    Items,
    Arps,
}

/// Runs `$body` with `$entity` bound to the [`EntityClient`] for `$resource`.
///
/// [`EntityClient`]: logo_objects_api::EntityClient
macro_rules! with_entity {
    ($client:expr, $resource:expr, |$entity:ident| $body:expr) => {
        match $resource {
            $crate::commands::Resource::Items => {
                let $entity = $client.entity::<logo_objects_api::entities::Items>();
                $body
            }
            $crate::commands::Resource::Arps => {
                let $entity = $client.entity::<logo_objects_api::entities::Arps>();
                $body
            }
        }
    };
}
pub(crate) use with_entity;

pub mod count;
pub mod filters;
pub mod get;
pub mod list;
pub mod ping;
