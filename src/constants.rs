/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const STATIONS_PATH: &str = "/stations.json";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

// Cache Proxy
pub const CACHE_PREFIX: &str = "my-bike";
pub const CACHE_VERSION: &str = "my-bike-v1";
pub const CACHED_URLS: &[&str] = &[
    "/",
    "/img/favicon.png",
    "/img/icon-120.png",
    "/img/icon-144.png",
    "/img/icon-152.png",
    "/img/icon-192.png",
    "/img/icon-384.png",
    "/img/logo.png",
    "/img/status-available.png",
    "/img/status-closed.png",
    "/img/status-empty.png",
    "/img/status-full.png",
    "/js/axios.min.js",
    "/js/vue.min.js",
    "/js/app.js",
    "/main.css",
];

// Persistence
pub const LAST_UPDATED_KEY: &str = "lastUpdated";

// Geolocation
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// Push Notifications
pub const APPLICATION_SERVER_KEY: &str =
    "BBguu1xylfbRVZa3LYuaIgg5wqDa4bGUE4DGY4ZSLehyfn4e7ZEv3IO9gmxWkpzBJHoNyCxJICRm_E7_uKLUtJ0";
pub const NOTIFICATION_TITLE: &str = "MyBike";
pub const NOTIFICATION_ICON: &str = "img/icon-192.png";
pub const NEWS_URL: &str = "https://www.velo-antwerpen.be/en/news";
