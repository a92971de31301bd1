//! CSS selectors and page scripts for the site's UI. Kept in one place so a
//! site redesign is a one-file change.

/// Full-page loading overlay shown while a route renders.
pub const LOADER: &str = ".loader";

/// Login form fields and the post-login account control.
pub const LOGIN_EMAIL: &str = "#login-form-email";
pub const LOGIN_PASSWORD: &str = "#login-form-password";
pub const ACCOUNT_MENU: &str = ".account-menu-toggle";

/// The track list container and its row internals.
pub const TABLE_MEDIA: &str = ".table-media";
pub const ROW_ITEM: &str = ".table-media .row-item";
pub const ROW_TITLE: &str = ".row-track-name span";
pub const ROW_ARTIST_LINK: &str = ".row-artist .link";
/// Single unnamed download control on history-style rows.
pub const ROW_DOWNLOAD: &str = ".hide-mobile";
/// Per-edition version tags within a row.
pub const EDITION_TAG: &str = ".tag-link";

/// Pagination strip at the bottom of paginated grids.
pub const PAGINATION_ITEM: &str = ".pagination li";
/// Text of the next-page pagination item.
pub const NEXT_PAGE_GLYPH: &str = "\u{203a}";

/// Rate-limit popup internals. Title and close are found within the popup.
pub const POPUP: &str = ".popup_inner";
pub const POPUP_TITLE: &str = ".title";
pub const POPUP_CLOSE: &str = "div.close";
/// Title text that confirms the overlay is the download-limit popup.
pub const DOWNLOAD_LIMIT_TITLE: &str = "Download Limit";

pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// WebDriver key code for Enter, embeddable in typed text.
pub const KEY_ENTER: &str = "\u{e007}";
