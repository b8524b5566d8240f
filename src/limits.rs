// Hard caps on user-supplied input; violations surface as Validation errors.

pub const MAX_PARTY_SIZE: u32 = 100;
pub const MAX_NAME_LEN: usize = 128;
pub const MAX_PHONE_LEN: usize = 32;
pub const MAX_EMAIL_LEN: usize = 128;
pub const MAX_SPECIAL_REQUESTS_LEN: usize = 1024;
pub const MAX_CANCEL_REASON_LEN: usize = 256;
