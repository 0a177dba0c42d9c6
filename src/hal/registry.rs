//! Resource ownership
//!
//! On a single-board computer, pins and buses are addressed by number and
//! nothing stops two drivers from opening the same line. The registry
//! records which resources are in use so that a second claim fails fast
//! instead of silently sharing the line. A [`Claim`] releases its resource
//! when dropped.
//!
//! The registry uses single-threaded interior mutability. Callers that
//! share one between threads must serialise access themselves.

use core::cell::RefCell;
use core::ops::{Deref, DerefMut};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use heapless::Vec;

use crate::config::MAX_CLAIMED_RESOURCES;
use crate::error::{Error, Result};

/// One hardware resource that a driver can own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resource {
    /// GPIO line by pin number
    Gpio(u16),
    /// Analog input channel
    Analog(u8),
    /// I2C device: bus index plus 7-bit address
    I2c {
        /// Bus index
        bus: u8,
        /// 7-bit device address
        address: u8,
    },
    /// SPI device: bus index plus chip-select line
    Spi {
        /// Bus index
        bus: u8,
        /// Chip-select line
        chip_select: u16,
    },
    /// UART port
    Uart(u8),
    /// PWM output by pin number
    Pwm(u16),
}

/// Tracks which resources are currently claimed.
pub struct ResourceRegistry {
    claimed: RefCell<Vec<Resource, MAX_CLAIMED_RESOURCES>>,
}

impl ResourceRegistry {
    /// Create an empty registry
    #[must_use]
    pub const fn new() -> Self {
        Self {
            claimed: RefCell::new(Vec::new()),
        }
    }

    /// Claim a resource.
    ///
    /// # Errors
    ///
    /// [`Error::ResourceBusy`] if the resource is already claimed,
    /// [`Error::RegistryFull`] if no slot is left.
    pub fn claim(&self, resource: Resource) -> Result<Claim<'_>> {
        let mut claimed = self.claimed.borrow_mut();
        if claimed.contains(&resource) {
            warn!("{:?} is already claimed", resource);
            return Err(Error::ResourceBusy(resource));
        }
        claimed.push(resource).map_err(|_| Error::RegistryFull)?;
        trace!("claimed {:?}", resource);
        Ok(Claim {
            registry: self,
            resource,
        })
    }

    /// Claim a resource and bind it to the platform object that drives it.
    ///
    /// # Errors
    ///
    /// Same as [`ResourceRegistry::claim`].
    pub fn acquire<T>(&self, resource: Resource, inner: T) -> Result<Claimed<'_, T>> {
        let claim = self.claim(resource)?;
        Ok(Claimed { inner, claim })
    }

    /// Check whether a resource is claimed
    #[must_use]
    pub fn is_claimed(&self, resource: Resource) -> bool {
        self.claimed.borrow().contains(&resource)
    }

    /// Number of resources currently claimed
    #[must_use]
    pub fn claimed_count(&self) -> usize {
        self.claimed.borrow().len()
    }

    fn release(&self, resource: Resource) {
        let mut claimed = self.claimed.borrow_mut();
        if let Some(idx) = claimed.iter().position(|r| *r == resource) {
            claimed.swap_remove(idx);
            trace!("released {:?}", resource);
        }
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive ownership of one resource, released on drop.
#[must_use = "dropping a claim releases the resource immediately"]
pub struct Claim<'r> {
    registry: &'r ResourceRegistry,
    resource: Resource,
}

impl Claim<'_> {
    /// The claimed resource
    #[must_use]
    pub const fn resource(&self) -> Resource {
        self.resource
    }

    /// Release the resource now
    pub fn release(self) {}
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.registry.release(self.resource);
    }
}

/// A platform object bundled with the claim on the resource it drives.
///
/// Pins wrapped this way still implement the `embedded-hal` digital traits,
/// so they can be handed straight to a driver.
pub struct Claimed<'r, T> {
    inner: T,
    claim: Claim<'r>,
}

impl<T> Claimed<'_, T> {
    /// The claimed resource
    #[must_use]
    pub const fn resource(&self) -> Resource {
        self.claim.resource
    }

    /// Release the claim and return the platform object
    pub fn into_inner(self) -> T {
        let Self { inner, claim } = self;
        drop(claim);
        inner
    }
}

impl<T> Deref for Claimed<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for Claimed<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: ErrorType> ErrorType for Claimed<'_, T> {
    type Error = T::Error;
}

impl<T: OutputPin> OutputPin for Claimed<'_, T> {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.inner.set_low()
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.inner.set_high()
    }
}

impl<T: StatefulOutputPin> StatefulOutputPin for Claimed<'_, T> {
    fn is_set_high(&mut self) -> core::result::Result<bool, Self::Error> {
        self.inner.is_set_high()
    }

    fn is_set_low(&mut self) -> core::result::Result<bool, Self::Error> {
        self.inner.is_set_low()
    }
}

impl<T: InputPin> InputPin for Claimed<'_, T> {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        self.inner.is_high()
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        self.inner.is_low()
    }
}
