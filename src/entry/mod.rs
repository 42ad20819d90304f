//! Entry point location and execution.

use std::sync::Arc;

use crate::capability::{Capability, TypeKey};
use crate::error::{BoxError, Error};
use crate::store::ValueStore;

/// The application entry point. `run` blocks until the application should stop.
pub trait Main {
    fn run(&self) -> Result<(), BoxError>;
}

impl Capability for dyn Main {}

/// Extract the single `Main` and release everything else in the store.
pub fn locate(store: ValueStore) -> Result<Arc<dyn Main>, Error> {
    let key = TypeKey::of::<dyn Main>();
    let Some(slot) = store.get(&key) else {
        tracing::error!(values = store.len(), "No Main capability produced");
        return Err(Error::NoMain);
    };
    let Some(value) = slot.single() else {
        tracing::error!("Main capability is stored as a sequence");
        return Err(Error::NoMain);
    };
    let main = value
        .downcast::<dyn Main>()
        .ok_or_else(|| Error::Bug("Main capability found but can not downcast to Main".into()))?;

    drop(store);
    Ok(main)
}

/// Run `main`, wrapping a failure as `Error::Main`.
pub fn run_main(main: Arc<dyn Main>) -> Result<(), Error> {
    tracing::info!("Running Main");
    let result = main.run().map_err(Error::Main);
    match &result {
        Ok(()) => tracing::info!("Main returned"),
        Err(e) => tracing::warn!(error = %e, "Main returned an error"),
    }
    result
}
