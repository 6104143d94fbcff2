use crate::config::fragment::ConfigFragment;
use crate::package::container::{ServiceBinder, ServiceContainer};
use crate::package::error::PackageFailure;
use crate::package::lifecycle::InitContext;

/// The contract every package implements.
///
/// `identifier`, `config`, `register` and `create` are type-level hooks
/// (they run before any instance exists); `init` runs on the single instance
/// built for the boot. A type is turned into a registrable unit with
/// [`PackageDefinition::of`](crate::package::PackageDefinition::of), so a
/// type that does not implement this trait cannot be registered at all.
pub trait Package: Send + Sync + 'static {
    /// Identifier under which manifests and configuration refer to the package.
    fn identifier() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }

    /// Configuration contributed at the package tier, if any.
    fn config() -> Result<Option<ConfigFragment>, PackageFailure>
    where
        Self: Sized,
    {
        Ok(None)
    }

    /// Bind services. Must not perform heavy initialization.
    fn register(_services: &mut ServiceBinder<'_>) -> Result<(), PackageFailure>
    where
        Self: Sized,
    {
        Ok(())
    }

    /// Build the instance against the final service container.
    fn create(container: &ServiceContainer) -> Result<Self, PackageFailure>
    where
        Self: Sized;

    /// Runs once every package has registered its services.
    fn init(&self, _context: &InitContext<'_>) -> Result<(), PackageFailure> {
        Ok(())
    }
}
