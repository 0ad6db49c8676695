//! Form page handlers
//!
//! One page: the input form, and below it either the two rounded rates or
//! an error message.

use aml_core::{AgeGroup, Ethnicity, Race, Sex};
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::Html,
    Form,
};

use crate::error::AppError;
use crate::handlers::predict::run_prediction;
use crate::models::{PredictionRequest, PredictionResponse};
use crate::AppState;

const TITLE: &str = "Predictive Analytics for Acute Myeloid Leukemia";

/// Empty form
pub async fn index() -> Html<String> {
    Html(render(None, None))
}

/// Form submission
pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<PredictionRequest>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let req = match form {
        Ok(Form(req)) => req,
        Err(rejection) => {
            let err = AppError::ValidationError(rejection.body_text());
            return (err.status(), Html(render(None, Some(Err(err)))));
        }
    };

    match run_prediction(state, req.clone()).await {
        Ok(response) => (StatusCode::OK, Html(render(Some(&req), Some(Ok(response))))),
        Err(err) => (err.status(), Html(render(Some(&req), Some(Err(err))))),
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn render(form: Option<&PredictionRequest>, outcome: Option<Result<PredictionResponse, AppError>>) -> String {
    let sex = form.map(|f| f.sex.as_str());
    let age_group = form.map(|f| f.age_group.as_str());
    let ethnicity = form.map(|f| f.ethnicity.as_str());
    let race = form.map(|f| f.race.as_str());
    let year = form.map(|f| f.year).unwrap_or(2010);

    let result = match outcome {
        None => String::new(),
        Some(Ok(response)) => format!(
            "<section id=\"result\">\n\
             <p>Crude Mortality Rate: <strong>{}</strong></p>\n\
             <p>Survival Rate: <strong>{}</strong></p>\n\
             </section>",
            response.rounded.crude_mortality_rate, response.rounded.survival_rate
        ),
        Some(Err(err)) => format!(
            "<section id=\"error\"><p>{}</p></section>",
            escape_html(&err.public_message())
        ),
    };

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n\
         <h1>{title}</h1>\n\
         <form method=\"post\" action=\"/predict\">\n\
         {sex}\n\
         <label>Year <input type=\"number\" name=\"Year\" min=\"1900\" max=\"2999\" value=\"{year}\" required></label>\n\
         {age_group}\n\
         {ethnicity}\n\
         {race}\n\
         <button type=\"submit\">Predict</button>\n\
         </form>\n\
         {result}\n\
         </body>\n\
         </html>\n",
        title = TITLE,
        sex = select("Sex", "Sex", Sex::ALL.map(Sex::label), sex),
        year = year,
        age_group = select("Age Group", "AgeGroup", AgeGroup::ALL.map(AgeGroup::label), age_group),
        ethnicity = select("Ethnicity", "Ethnicity", Ethnicity::ALL.map(Ethnicity::label), ethnicity),
        race = select("Race", "Race", Race::ALL.map(Race::label), race),
        result = result,
    )
}

fn select<const N: usize>(label: &str, name: &str, options: [&str; N], selected: Option<&str>) -> String {
    let options: String = options
        .iter()
        .map(|opt| {
            let attr = if Some(*opt) == selected { " selected" } else { "" };
            format!("<option value=\"{0}\"{1}>{0}</option>", escape_html(opt), attr)
        })
        .collect();

    format!("<label>{label} <select name=\"{name}\">{options}</select></label>")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
