use std::fmt::Write;

use crate::models::Category;

use super::{Notices, Tab, escape, layout};

pub fn render(categories: &[Category], notices: &Notices) -> String {
    let mut body = String::from(
        "<fieldset id=\"create-category\"><legend>Add category</legend>\
         <form method=\"post\" action=\"/categories\">\
         <label>Name <input name=\"name\" required></label> \
         <button type=\"submit\">Save category</button></form></fieldset>\
         <h2>Existing categories</h2>",
    );

    if categories.is_empty() {
        body.push_str(
            "<p class=\"notice info\" id=\"no-categories\">No categories yet, or the table is not accessible.</p>",
        );
        return layout(Tab::Categories, notices, &body);
    }

    body.push_str("<table id=\"categories\"><thead><tr><th>ID</th><th>Name</th><th></th></tr></thead><tbody>");
    for category in categories {
        let _ = write!(
            body,
            "<tr data-id=\"{id}\"><td>{id}</td><td>{name}</td><td>\
             <form class=\"inline\" method=\"post\" action=\"/categories/{id}/delete\">\
             <button type=\"submit\" title=\"Deleting is permanent\">Delete</button></form></td></tr>",
            id = category.id,
            name = escape(&category.name)
        );
    }
    body.push_str("</tbody></table>");
    layout(Tab::Categories, notices, &body)
}
