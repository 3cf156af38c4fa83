use serde::{Deserialize, Serialize};

use crate::domain::{BillId, UserType};

/// Response to a receipt upload: the stored file location and the key of the
/// bill record the backend created for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_url: String,
    pub key: BillId,
}

/// The JSON record kept in the session store under the `"user"` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub email: String,
}
