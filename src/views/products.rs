use std::fmt::Write;

use crate::{
    models::{Category, InventorySummary, Product, ProductColumns},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
};

use super::{Notices, Tab, escape, layout};

pub struct ProductsView<'a> {
    pub categories: &'a [Category],
    /// Every fetched product, used for the delete selector.
    pub products: &'a [Product],
    /// Products after the listing controls were applied.
    pub visible: &'a [Product],
    pub columns: ProductColumns,
    pub summary: &'a InventorySummary,
    pub query: &'a ProductQuery,
}

pub fn render(view: &ProductsView<'_>, notices: &Notices) -> String {
    let mut body = String::new();
    metrics(&mut body, view);
    create_form(&mut body, view.categories);
    controls(&mut body, view);
    table(&mut body, view);
    delete_form(&mut body, view.products);
    layout(Tab::Products, notices, &body)
}

fn metrics(body: &mut String, view: &ProductsView<'_>) {
    let _ = write!(
        body,
        "<section class=\"metrics\">\
         <div class=\"metric\" id=\"metric-products\"><strong>{}</strong>products</div>",
        view.summary.products
    );
    if view.columns.quantity {
        let _ = write!(
            body,
            "<div class=\"metric\" id=\"metric-units\"><strong>{}</strong>units in stock</div>",
            view.summary.units
        );
    }
    let _ = write!(
        body,
        "<div class=\"metric\" id=\"metric-value\"><strong>{:.2}</strong>total inventory value</div>\
         </section>",
        view.summary.total_value
    );
}

fn create_form(body: &mut String, categories: &[Category]) {
    if categories.is_empty() {
        body.push_str(
            "<div class=\"notice warning\" id=\"no-categories\">Products need a category. \
             Add one on the <a href=\"/categories\">Categories</a> tab first.</div>",
        );
        return;
    }

    body.push_str(
        "<fieldset id=\"create-product\"><legend>Add product</legend>\
         <form method=\"post\" action=\"/products\">\
         <label>Name <input name=\"name\" required></label> \
         <label>Category <select name=\"category_id\" required>",
    );
    for category in categories {
        let _ = write!(
            body,
            "<option value=\"{}\">{}</option>",
            category.id,
            escape(&category.name)
        );
    }
    body.push_str(
        "</select></label> \
         <label>Price <input name=\"price\" type=\"number\" min=\"0\" step=\"0.01\" value=\"0.00\" required></label> \
         <label>Quantity <input name=\"quantity\" type=\"number\" min=\"0\" step=\"1\" value=\"1\" required></label><br>\
         <label>Description <textarea name=\"description\" rows=\"2\" cols=\"60\"></textarea></label><br>\
         <button type=\"submit\">Add product</button></form></fieldset>",
    );
}

fn selected(flag: bool) -> &'static str {
    if flag { " selected" } else { "" }
}

fn controls(body: &mut String, view: &ProductsView<'_>) {
    let query = view.query;
    let _ = write!(
        body,
        "<form method=\"get\" action=\"/products\" id=\"listing-controls\">\
         <label>Search <input name=\"q\" value=\"{}\"></label> \
         <label>Category <select name=\"category_id\"><option value=\"\">All</option>",
        escape(query.q.as_deref().unwrap_or_default())
    );
    for category in view.categories {
        let _ = write!(
            body,
            "<option value=\"{}\"{}>{}</option>",
            category.id,
            selected(query.category_id == Some(category.id)),
            escape(&category.name)
        );
    }
    body.push_str("</select></label> <label>Sort by <select name=\"sort_by\"><option value=\"\">Newest</option>");
    for by in ProductSortBy::ALL {
        if by == ProductSortBy::Quantity && !view.columns.quantity {
            continue;
        }
        let _ = write!(
            body,
            "<option value=\"{0}\"{1}>{0}</option>",
            by.as_str(),
            selected(query.sort_by == Some(by))
        );
    }
    body.push_str("</select></label> <select name=\"sort_order\">");
    for order in [SortOrder::Asc, SortOrder::Desc] {
        let _ = write!(
            body,
            "<option value=\"{0}\"{1}>{0}</option>",
            order.as_str(),
            selected(query.sort_order == Some(order))
        );
    }
    body.push_str("</select> <button type=\"submit\">Apply</button></form>");
}

fn table(body: &mut String, view: &ProductsView<'_>) {
    if view.products.is_empty() {
        body.push_str("<p class=\"notice info\" id=\"no-products\">No products in the store.</p>");
        return;
    }

    let columns = view.columns;
    body.push_str("<table id=\"products\"><thead><tr><th>ID</th><th>Name</th><th>Price</th>");
    if columns.quantity {
        body.push_str("<th>Quantity</th>");
    }
    body.push_str("<th>Category</th>");
    if columns.description {
        body.push_str("<th>Description</th>");
    }
    body.push_str("<th>Edit</th></tr></thead><tbody>");

    for product in view.visible {
        let _ = write!(
            body,
            "<tr data-id=\"{}\"><td>{}</td><td>{}</td><td>{:.2}</td>",
            product.id,
            product.id,
            escape(&product.name),
            product.price
        );
        if columns.quantity {
            let _ = write!(
                body,
                "<td class=\"quantity\">{}</td>",
                product.quantity.map(|q| q.to_string()).unwrap_or_default()
            );
        }
        let _ = write!(body, "<td>{}</td>", escape(&product.category_name));
        if columns.description {
            let _ = write!(
                body,
                "<td>{}</td>",
                escape(product.description.as_deref().unwrap_or_default())
            );
        }
        body.push_str("<td>");
        if columns.quantity {
            let _ = write!(
                body,
                "<form class=\"inline\" method=\"post\" action=\"/products/{id}/quantity\">\
                 <input type=\"hidden\" name=\"on_hand\" value=\"{on_hand}\">\
                 <input name=\"amount\" type=\"number\" min=\"1\" step=\"1\" value=\"1\" size=\"4\">\
                 <button name=\"movement\" value=\"increment\">+</button>\
                 <button name=\"movement\" value=\"decrement\">&minus;</button></form> ",
                id = product.id,
                on_hand = product.on_hand()
            );
        }
        let _ = write!(
            body,
            "<form class=\"inline\" method=\"post\" action=\"/products/{}/price\">\
             <input name=\"price\" type=\"number\" min=\"0\" step=\"0.01\" value=\"{:.2}\" size=\"6\">\
             <button type=\"submit\">Set price</button></form></td></tr>",
            product.id, product.price
        );
    }
    body.push_str("</tbody></table>");
    if view.visible.is_empty() {
        body.push_str("<p class=\"notice info\">No products match the current filter.</p>");
    }
}

fn delete_form(body: &mut String, products: &[Product]) {
    if products.is_empty() {
        return;
    }
    body.push_str(
        "<fieldset id=\"delete-product\"><legend>Delete product</legend>\
         <form method=\"post\" action=\"/products/delete\">\
         <label>Product <select name=\"product_id\">",
    );
    for product in products {
        let _ = write!(
            body,
            "<option value=\"{}\">{} ({:.2})</option>",
            product.id,
            escape(&product.name),
            product.price
        );
    }
    body.push_str(
        "</select></label> <button type=\"submit\">Delete selected product</button>\
         <p><small>Deleting is permanent and cannot be undone.</small></p></form></fieldset>",
    );
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::services::product_service::summarize;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id,
            name: name.into(),
            price: Decimal::new(1999, 2),
            quantity: Some(2),
            description: Some("<script>".into()),
            category_id: Some(1),
            category_name: "Electronics".into(),
        }
    }

    #[test]
    fn form_is_replaced_by_warning_without_categories() {
        let summary = summarize(&[]).unwrap();
        let query = ProductQuery::default();
        let html = render(
            &ProductsView {
                categories: &[],
                products: &[],
                visible: &[],
                columns: ProductColumns::default(),
                summary: &summary,
                query: &query,
            },
            &Notices::default(),
        );
        assert!(html.contains("id=\"no-categories\""));
        assert!(!html.contains("id=\"create-product\""));
    }

    #[test]
    fn hides_missing_columns_and_escapes_cells() {
        let items = vec![product(1, "Lamp & Shade")];
        let summary = summarize(&items).unwrap();
        let query = ProductQuery::default();
        let categories = vec![Category {
            id: 1,
            name: "Electronics".into(),
        }];
        let html = render(
            &ProductsView {
                categories: &categories,
                products: &items,
                visible: &items,
                columns: ProductColumns {
                    quantity: false,
                    description: true,
                },
                summary: &summary,
                query: &query,
            },
            &Notices::default(),
        );
        assert!(!html.contains("<th>Quantity</th>"));
        assert!(!html.contains("/products/1/quantity"));
        assert!(html.contains("Lamp &amp; Shade"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<strong>39.98</strong>"));
    }
}
