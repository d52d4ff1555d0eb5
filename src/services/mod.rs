pub mod address_service;
pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod category_service;
pub mod checkout_service;
pub mod contact_service;
pub mod content_service;
pub mod news_service;
pub mod page_service;
pub mod product_service;
pub mod service_service;
pub mod settings_service;
