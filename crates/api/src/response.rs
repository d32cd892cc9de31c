use serde::Serialize;

/// Success envelope: every JSON body other than errors and `/health` is
/// `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
