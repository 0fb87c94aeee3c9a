use std::time::Duration;

// JWT Configuration
pub const JWT_ACCESS_TOKEN_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

// Pagination defaults
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const CATALOG_PAGE_SIZE: i64 = 12;
pub const MAX_PAGE_SIZE: i64 = 100;

// Inventory and money bounds; prices are stored as NUMERIC(10,2)
pub const MAX_STOCK: i32 = 1_000_000;
pub const MAX_PRICE_CENTS: i64 = 9_999_999_999;
pub const PRICE_SCALE: u32 = 2;

// Review constraints
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

// Success messages
pub const SUCCESS_USER_CREATED: &str = "registered successfully";
pub const SUCCESS_LOGIN: &str = "Login successful";
pub const SUCCESS_LOGOUT: &str = "Logged out successfully";
pub const SUCCESS_ITEM_CREATED: &str = "Item created successfully";
pub const SUCCESS_ITEM_UPDATED: &str = "Item updated successfully";
pub const SUCCESS_ITEM_DELETED: &str = "Item deleted successfully";
pub const SUCCESS_CART_ADDED: &str = "Item added to cart";
pub const SUCCESS_CART_UPDATED: &str = "Cart item updated";
pub const SUCCESS_CART_REMOVED: &str = "Item removed from cart";
pub const SUCCESS_CHECKOUT: &str = "Checkout successful";
pub const SUCCESS_ORDER_PLACED: &str = "Order placed successfully";
pub const SUCCESS_ORDER_STATUS: &str = "Order status updated successfully";
pub const SUCCESS_REVIEW_CREATED: &str = "Review submitted successfully";
pub const SUCCESS_REVIEW_UPDATED: &str = "Review updated successfully";
pub const SUCCESS_REVIEW_DELETED: &str = "Review deleted successfully";
pub const SUCCESS_REPORT_CREATED: &str = "Item reported successfully";
pub const SUCCESS_REPORT_REVIEWED: &str = "Report reviewed successfully";
pub const SUCCESS_ROLE_UPDATED: &str = "User role updated successfully";
pub const SUCCESS_USER_DELETED: &str = "User deleted successfully";
pub const SUCCESS_BUSINESS_APPROVED: &str = "Business approved successfully";
pub const SUCCESS_BUSINESS_REJECTED: &str = "Business rejected successfully";
pub const SUCCESS_PROFILE_UPDATED: &str = "Shop profile updated successfully";
pub const SUCCESS_VARIATION_ADDED: &str = "Variation added successfully";
pub const SUCCESS_VARIATION_UPDATED: &str = "Variation updated successfully";
pub const SUCCESS_VARIATION_DELETED: &str = "Variation deleted successfully";
pub const SUCCESS_ADDRESS_ADDED: &str = "Address added successfully";
pub const SUCCESS_ADDRESS_UPDATED: &str = "Address updated successfully";
pub const SUCCESS_ADDRESS_DELETED: &str = "Address deleted successfully";
pub const SUCCESS_ACCOUNT_DELETED: &str = "Account deleted successfully";

// Left in place of a review's comment when its author deletes their account
pub const ANONYMIZED_REVIEW_COMMENT: &str = "Comment removed as user account was deleted.";

// Error messages
pub const ERROR_INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const ERROR_EMAIL_ALREADY_EXISTS: &str = "Email already registered";
pub const ERROR_NOT_ENOUGH_STOCK: &str = "Not enough stock available";
pub const ERROR_ITEM_NOT_FOUND: &str = "Item not found";
pub const ERROR_CART_NOT_FOUND: &str = "Cart not found";
pub const ERROR_CART_ITEM_NOT_FOUND: &str = "Cart item not found";
pub const ERROR_NOTHING_SELECTED: &str = "No items selected for checkout";
pub const ERROR_ORDER_NOT_FOUND: &str = "Order not found";
pub const ERROR_ALREADY_REVIEWED: &str = "You have already reviewed this item";
pub const ERROR_ALREADY_REPORTED: &str = "You have already reported this item";
pub const ERROR_VARIATION_NOT_FOUND: &str = "Variation not found";
pub const ERROR_DUPLICATE_VARIATION: &str = "Duplicate variation for this item";
pub const ERROR_ADDRESS_NOT_FOUND: &str = "Address not found";
pub const ERROR_INCORRECT_PASSWORD: &str = "Incorrect password";
pub const ERROR_STOCK_OVERFLOW: &str = "Stock would exceed the maximum allowed";
pub const ERROR_TOTAL_TOO_LARGE: &str = "Order total exceeds the maximum allowed";
