//! Challenge widget markup.
//!
//! The template is fixed text parameterized by the session's public key and last
//! error code. Both values are URL-encoded into the query strings, which also keeps
//! them free of characters that could break out of the attributes.

use std::io;

use captcha_common::RenderedFields;
use captcha_common::constants::widget_fields;

use crate::authority::AuthorityEndpoints;

/// Render the widget for the given session fields
pub fn render_widget(endpoints: &AuthorityEndpoints, fields: &RenderedFields) -> String {
    let key = urlencoding::encode(&fields.public_key);
    let error = urlencoding::encode(&fields.error_code);
    let challenge_url = &endpoints.challenge_url;
    let noscript_url = &endpoints.noscript_url;
    let challenge_field = widget_fields::CHALLENGE;
    let response_field = widget_fields::RESPONSE;

    format!(
        r#"
<script type="text/javascript" src="{challenge_url}?k={key}&amp;error={error}"></script>
<noscript>
	<iframe src="{noscript_url}?k={key}&amp;error={error}" height="300" width="500" frameborder="0"></iframe><br>
	<textarea name="{challenge_field}" rows="3" cols="40"></textarea>
	<input type="hidden" name="{response_field}" value="manual_challenge">
</noscript>
"#
    )
}

/// Render the widget straight into a writer
pub fn write_widget<W: io::Write>(
    writer: &mut W,
    endpoints: &AuthorityEndpoints,
    fields: &RenderedFields,
) -> io::Result<()> {
    writer.write_all(render_widget(endpoints, fields).as_bytes())
}
