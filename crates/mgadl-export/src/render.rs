use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ExportError;
use crate::summary::ResultSummary;

const SUMMARY_TEMPLATE_NAME: &str = "summary.txt";

/// Built-in plain-text result template (Jinja2 syntax).
pub const SUMMARY_TEMPLATE: &str = "\
{{ instrument }} 총점: {{ total }} / {{ max_total }}
{% for row in breakdown -%}
- {{ row.question }}: {{ row.score }}점 ({{ row.label }})
{% endfor -%}
{% if written -%}
저장 위치: {{ written.spreadsheet_title }} / {{ written.worksheet_title }}
{%- if written.updated_range %} ({{ written.updated_range }}){% endif %}
{% endif -%}
";

/// Where the record was written, for the summary footer.
#[derive(Debug, Clone, Serialize)]
pub struct WrittenTo {
    pub spreadsheet_title: String,
    pub worksheet_title: String,
    pub updated_range: Option<String>,
}

#[derive(Serialize)]
struct SummaryView<'a> {
    #[serde(flatten)]
    summary: &'a ResultSummary,
    written: Option<&'a WrittenTo>,
}

/// Render the result summary with the built-in template.
pub fn render_summary(
    summary: &ResultSummary,
    written: Option<&WrittenTo>,
) -> Result<String, ExportError> {
    render_template(SUMMARY_TEMPLATE_NAME, SUMMARY_TEMPLATE, summary, written)
}

/// Render a caller-supplied template against the result summary.
///
/// Context variables: `instrument`, `total`, `max_total`, `breakdown`
/// (rows with `item_id`, `question`, `score`, `label`) and `written`.
pub fn render_template(
    template_name: &str,
    template_content: &str,
    summary: &ResultSummary,
    written: Option<&WrittenTo>,
) -> Result<String, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(template_name, template_content)
        .map_err(|e| ExportError::TemplateParse(e.to_string()))?;

    let value = serde_json::to_value(SummaryView { summary, written })?;
    let context = Context::from_value(value)
        .map_err(|e| ExportError::TemplateRender(e.to_string()))?;

    let rendered = tera.render(template_name, &context)?;
    tracing::debug!(template = template_name, bytes = rendered.len(), "summary rendered");
    Ok(rendered)
}
