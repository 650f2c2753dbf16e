//! Try unpack a vector into a tuple.

pub trait TryUnpack<T>: Sized {
    /// Returns the tuple, or the expected and actual lengths.
    fn try_unpack(self) -> Result<T, (usize, usize)>;
}

impl<T> TryUnpack<()> for Vec<T> {
    fn try_unpack(self) -> Result<(), (usize, usize)> {
        if !self.is_empty() {
            return Err((0, self.len()));
        }
        Ok(())
    }
}

impl<T> TryUnpack<(T,)> for Vec<T> {
    fn try_unpack(self) -> Result<(T,), (usize, usize)> {
        match <[T; 1]>::try_from(self) {
            Ok([a]) => Ok((a,)),
            Err(vec) => Err((1, vec.len())),
        }
    }
}

impl<T> TryUnpack<(T, T)> for Vec<T> {
    fn try_unpack(self) -> Result<(T, T), (usize, usize)> {
        match <[T; 2]>::try_from(self) {
            Ok([a, b]) => Ok((a, b)),
            Err(vec) => Err((2, vec.len())),
        }
    }
}
