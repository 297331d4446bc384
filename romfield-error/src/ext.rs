use crate::{ErrString, RomError, RomResult};

/// Attach a lazily built context message to the error of a result.
pub trait ContextExt<T> {
    /// Wrap the error, if any, in [`RomError::Context`].
    fn context<M, F>(self, msg: F) -> RomResult<T>
    where
        M: Into<ErrString>,
        F: FnOnce() -> M;
}

impl<T, E> ContextExt<T> for Result<T, E>
where
    E: Into<RomError>,
{
    fn context<M, F>(self, msg: F) -> RomResult<T>
    where
        M: Into<ErrString>,
        F: FnOnce() -> M,
    {
        self.map_err(|e| {
            let err: RomError = e.into();
            err.with_context(msg())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom_err;

    #[test]
    fn context_wraps_error() {
        let res: RomResult<()> = Err(rom_err!("boom"));
        let err = res.context(|| "while saving field 3").unwrap_err();
        assert!(matches!(err, RomError::Context(..)));
        assert!(err.to_string().starts_with("while saving field 3"));
    }
}
