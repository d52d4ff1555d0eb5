use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        addresses::AddressList,
        admin::{Dashboard, StatusCounts, TopProduct, UserList},
        categories::{CategoryList, CategoryTree},
        checkout::{CheckoutItem, CheckoutResponse, OrderList},
        products::ProductList,
    },
    error::FieldError,
    models::{
        Address, AuditEntry, Cart, CartLine, CartStatus, Category, CategoryKind, CategoryNode,
        Contact, Faq, NewsArticle, Page, Partner, Product, RepairService, Slider, StoreSettings,
        TeamMember, Testimonial, User,
    },
    pricing::QuantityMode,
    response::{ApiResponse, Meta},
    routes::{
        addresses, admin, auth, cart, categories, checkout, contacts, content, health, news,
        pages, params, products, services, settings,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::current_user,
        auth::update_password,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_item,
        cart::remove_item,
        cart::clear_cart,
        checkout::checkout,
        checkout::list_orders,
        checkout::get_order,
        addresses::list_addresses,
        addresses::create_address,
        addresses::update_address,
        addresses::set_default,
        addresses::delete_address,
        products::list_products,
        products::get_product_by_slug,
        products::admin_list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        categories::category_tree,
        categories::get_category,
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        services::list_services,
        services::get_service_by_slug,
        services::admin_list_services,
        services::get_service,
        services::create_service,
        services::update_service,
        services::delete_service,
        news::list_news,
        news::get_news_by_slug,
        news::admin_list_news,
        news::get_news,
        news::create_news,
        news::update_news,
        news::delete_news,
        pages::get_page_by_slug,
        pages::list_pages,
        pages::create_page,
        pages::update_page,
        pages::delete_page,
        content::list_sliders,
        content::admin_list_sliders,
        content::create_slider,
        content::update_slider,
        content::delete_slider,
        content::list_testimonials,
        content::admin_list_testimonials,
        content::create_testimonial,
        content::update_testimonial,
        content::delete_testimonial,
        content::list_partners,
        content::admin_list_partners,
        content::create_partner,
        content::update_partner,
        content::delete_partner,
        content::list_faqs,
        content::admin_list_faqs,
        content::create_faq,
        content::update_faq,
        content::delete_faq,
        content::list_team_members,
        content::admin_list_team_members,
        content::create_team_member,
        content::update_team_member,
        content::delete_team_member,
        settings::get_settings,
        settings::update_settings,
        contacts::submit_contact,
        contacts::list_contacts,
        contacts::update_contact,
        contacts::delete_contact,
        admin::dashboard,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::delete_order,
        admin::list_users,
        admin::create_user,
        admin::delete_user,
        admin::reset_password,
        admin::list_audit_logs
    ),
    components(
        schemas(
            User,
            Address,
            Cart,
            CartLine,
            CartStatus,
            CheckoutItem,
            Category,
            CategoryKind,
            CategoryNode,
            Product,
            RepairService,
            NewsArticle,
            Page,
            Slider,
            Testimonial,
            Partner,
            Faq,
            TeamMember,
            StoreSettings,
            Contact,
            QuantityMode,
            FieldError,
            Dashboard,
            AuditEntry,
            StatusCounts,
            TopProduct,
            params::Pagination,
            params::ProductQuery,
            params::CatalogQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Cart>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<OrderList>,
            ApiResponse<ProductList>,
            ApiResponse<CategoryTree>,
            ApiResponse<CategoryList>,
            ApiResponse<AddressList>,
            ApiResponse<UserList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Cart", description = "Visitor cart endpoints"),
        (name = "Checkout", description = "Checkout endpoint"),
        (name = "Orders", description = "Order history for signed-in users"),
        (name = "Addresses", description = "Saved shipping addresses"),
        (name = "Products", description = "Parts and accessories catalogue"),
        (name = "Categories", description = "Category trees"),
        (name = "Services", description = "Repair and maintenance services"),
        (name = "News", description = "News articles"),
        (name = "Pages", description = "Static pages"),
        (name = "Content", description = "Homepage content blocks"),
        (name = "Settings", description = "Store settings"),
        (name = "Contacts", description = "Contact form"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
