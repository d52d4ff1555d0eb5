pub mod addresses;
pub mod audit_logs;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod contacts;
pub mod faqs;
pub mod news;
pub mod pages;
pub mod partners;
pub mod product_images;
pub mod products;
pub mod services;
pub mod sliders;
pub mod store_settings;
pub mod team_members;
pub mod testimonials;
pub mod users;

pub use addresses::Entity as Addresses;
pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use contacts::Entity as Contacts;
pub use faqs::Entity as Faqs;
pub use news::Entity as News;
pub use pages::Entity as Pages;
pub use partners::Entity as Partners;
pub use product_images::Entity as ProductImages;
pub use products::Entity as Products;
pub use services::Entity as Services;
pub use sliders::Entity as Sliders;
pub use store_settings::Entity as StoreSettings;
pub use team_members::Entity as TeamMembers;
pub use testimonials::Entity as Testimonials;
pub use users::Entity as Users;
