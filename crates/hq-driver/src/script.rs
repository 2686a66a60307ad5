//! Border script construction

use anyhow::Result;

/// Script that parses `html`, finds the comment tree table and logs its
/// border attribute. The completion value is the attribute (or null).
pub fn border_script(html: &str) -> Result<String> {
    let literal = serde_json::to_string(html)?;
    Ok(format!(
        "var h = htmlParser({literal});\n\
         var f = h.find('table.comment-tree');\n\
         console.log(f.attr('border'));\n\
         f.attr('border');\n"
    ))
}
