/// Maximum sheet payload size in bytes (10MB)
pub const MAX_SHEET_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Extra request body allowance for multipart boundaries and text fields
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// The only content type accepted for sheet payloads
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Prefix of every public id generated for an uploaded sheet
pub const SHEET_PUBLIC_ID_PREFIX: &str = "sheet";

/// Default Cloudinary folder (matches the production account layout)
pub const DEFAULT_CLOUDINARY_FOLDER: &str = "lishmah_sources";

pub const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";

/// Upper bound for a single blob store call (upload or destroy)
pub const DEFAULT_BLOB_TIMEOUT_SECS: u64 = 30;

/// Upper bound for a single relational query
pub const DEFAULT_DB_TIMEOUT_SECS: u64 = 10;

/// Admin tokens are valid for 24 hours
pub const DEFAULT_JWT_EXPIRY_SECS: u64 = 24 * 60 * 60;

// =============================================================================
// Error Messages
// =============================================================================

pub const ERR_MISSING_FIELDS: &str = "Missing required fields (title and file)";

pub const ERR_EMPTY_TITLE: &str = "Title must not be empty";

pub const ERR_EMPTY_PAYLOAD: &str = "Uploaded file is empty";

pub const ERR_ONLY_PDF: &str = "Only PDF files are allowed";

pub const ERR_INVALID_CATEGORY_ID: &str = "Invalid category_id";

pub const ERR_CATEGORY_NAME_REQUIRED: &str = "Category name required";

pub const ERR_CREDENTIALS_REQUIRED: &str = "Username and password required";

pub const ERR_FILE_TOO_LARGE: &str = "File too large";

// =============================================================================
// User-facing Messages (shown verbatim by the web client)
// =============================================================================

pub const MSG_SHEET_NOT_FOUND: &str = "דף המקורות לא נמצא";

pub const MSG_SHEET_CREATE_FAILED: &str = "שגיאה ביצירת דף המקורות";

pub const MSG_FILE_TOO_LARGE: &str = "הקובץ גדול מדי. מקסימום 10MB";

pub const MSG_CATEGORY_NOT_FOUND: &str = "קטגוריה לא נמצאה";

pub const MSG_CATEGORY_EXISTS: &str = "קטגוריה זו כבר קיימת";

pub const MSG_TOKEN_REQUIRED: &str = "נדרש אימות למשתמש מנהל";

pub const MSG_TOKEN_INVALID: &str = "אסימון לא תקף או פג תוקפו";

pub const MSG_INVALID_CREDENTIALS: &str = "שם משתמש או סיסמה שגויים";

pub const MSG_SERVER_CONFIG: &str = "שגיאת הגדרות שרת";

pub const MSG_INTERNAL: &str = "שגיאת שרת פנימית";

pub const MSG_ROUTE_NOT_FOUND: &str = "הנתיב לא נמצא";
