/// Error surfaced by driver operations.
///
/// `Bus` wraps the underlying `SpiDevice` error and is fatal to the current
/// operation; the endpoint loop MAY re-initialize the controller in
/// response. `Timeout` means a bounded status poll (PHY busy, soft-reset
/// clock-ready, TX idle) never observed the expected bit; the driver has
/// already attempted the errata workaround (TX reset pulse) where one
/// applies before returning it.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError<E> {
    Bus(E),
    Timeout,
}

impl<E> From<E> for DriverError<E> {
    fn from(err: E) -> Self {
        DriverError::Bus(err)
    }
}
