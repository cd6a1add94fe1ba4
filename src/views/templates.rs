use handlebars::Handlebars;
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

pub fn build_handlebars() -> Hbs {
    let mut hb = Handlebars::new();

    // Layout + pages
    hb.register_template_file("layouts/base", "templates/layouts/base.hbs")
        .expect("template layouts/base");

    hb.register_template_file("pages/order_list", "templates/pages/order_list.hbs")
        .expect("template pages/order_list");
    hb.register_template_file("pages/meal_create", "templates/pages/meal_create.hbs")
        .expect("template pages/meal_create");
    hb.register_template_file("pages/order_create", "templates/pages/order_create.hbs")
        .expect("template pages/order_create");
    hb.register_template_file("pages/order_update", "templates/pages/order_update.hbs")
        .expect("template pages/order_update");
    hb.register_template_file("pages/order_delete", "templates/pages/order_delete.hbs")
        .expect("template pages/order_delete");
    hb.register_template_file("pages/revenue", "templates/pages/revenue.hbs")
        .expect("template pages/revenue");
    hb.register_template_file("pages/not_found", "templates/pages/not_found.hbs")
        .expect("template pages/not_found");
    hb.register_template_file("pages/error", "templates/pages/error.hbs")
        .expect("template pages/error");
    hb.register_template_file("pages/api_docs", "templates/pages/api_docs.hbs")
        .expect("template pages/api_docs");

    // Partial endpoints
    hb.register_template_file("partials/order_rows", "templates/partials/order_rows.hbs")
        .expect("template partials/order_rows");

    let order_rows = std::fs::read_to_string("templates/partials/order_rows.hbs")
        .expect("partials/order_rows.hbs");
    hb.register_partial("order_rows", order_rows).expect("register order_rows partial");

    let field_errors = std::fs::read_to_string("templates/partials/field_errors.hbs")
        .expect("partials/field_errors.hbs");
    hb.register_partial("field_errors", field_errors).expect("register field_errors partial");

    let navbar = std::fs::read_to_string("templates/partials/navbar.hbs")
        .expect("partials/navbar.hbs");
    hb.register_partial("navbar", navbar).expect("register navbar partial");

    let footer = std::fs::read_to_string("templates/partials/footer.hbs")
        .expect("partials/footer.hbs");
    hb.register_partial("footer", footer).expect("register footer partial");

    Arc::new(hb)
}
