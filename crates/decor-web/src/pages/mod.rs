//! Page Components

mod blog_post;
mod home;
mod not_found;
mod pricing;

pub use blog_post::BlogPostPage;
pub use home::HomePage;
pub use not_found::NotFoundPage;
pub use pricing::PricingPage;
