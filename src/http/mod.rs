pub mod client;

pub use client::build_client;
pub use client::HttpClient;
pub use client::HttpClientConfig;
pub use client::RetryPolicy;
