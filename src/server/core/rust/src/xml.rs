/* src/server/core/rust/src/xml.rs */

use quick_xml::events::BytesStart;

/// Unescaped value of attribute `name`, if present.
pub(crate) fn attr(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, quick_xml::Error> {
  match element.try_get_attribute(name)? {
    Some(attribute) => Ok(Some(attribute.unescape_value()?.into_owned())),
    None => Ok(None),
  }
}

pub(crate) fn attr_or_default(
  element: &BytesStart<'_>,
  name: &str,
) -> Result<String, quick_xml::Error> {
  Ok(attr(element, name)?.unwrap_or_default())
}

pub(crate) fn local_name(element: &BytesStart<'_>) -> String {
  String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}
