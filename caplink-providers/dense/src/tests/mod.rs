pub(crate) use super::{DenseSource, PointMatrixProvider, PointMatrixProviderError};

mod support;
