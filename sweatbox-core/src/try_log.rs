use std::any::type_name;
use std::fmt;

use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::world::World;

/// Evaluates to the value of a [`TryLog`] expression,
/// or logs the failure and evaluates `$never` instead.
#[macro_export]
macro_rules! try_log {
    (
        $expr:expr,
        expect $must:literal $(
            (
                $($must_args:expr),* $(,)?
            )
        )?
        or $never:expr
    ) => {
        {
            if let Some(value) = $crate::try_log::TryLog::convert_or_log(
                $expr,
                format_args!($must, $($($must_args),*)?),
            ) {
                value
            } else {
                $never
            }
        }
    }
}

pub use try_log;

/// Like [`try_log!`], returning from the enclosing function on failure.
#[macro_export]
macro_rules! try_log_return {
    ($expr:expr, expect $must:literal $(, $($must_args:expr),*)? $(,)?) => {
        $crate::try_log!($expr, expect $must $(($($must_args),*))? or return)
    }
}

pub use try_log_return;

/// Component lookups that log an error when the component is missing.
pub trait WorldExt {
    fn log_get<T: Component>(&self, entity: Entity) -> Option<&T>;
}

impl WorldExt for World {
    fn log_get<T: Component>(&self, entity: Entity) -> Option<&T> {
        let value = self.get::<T>(entity);
        if value.is_none() {
            bevy::log::error!("Expected aircraft {entity:?} to have component {}", type_name::<T>());
        }
        value
    }
}

/// An expression that can be used for `$expr` in [`try_log!`](crate::try_log!).
pub trait TryLog<T> {
    /// Returns the successful result as `Some`, or log the error with `must`.
    fn convert_or_log(this: Self, must: impl fmt::Display) -> Option<T>;
}

impl<T> TryLog<T> for Option<T> {
    fn convert_or_log(this: Self, must: impl fmt::Display) -> Option<T> {
        if this.is_none() {
            bevy::log::error!("{must}");
        }
        this
    }
}

impl<T, E: fmt::Display> TryLog<T> for Result<T, E> {
    fn convert_or_log(this: Self, must: impl fmt::Display) -> Option<T> {
        this.inspect_err(|err| bevy::log::error!("{must}: {err}")).ok()
    }
}
