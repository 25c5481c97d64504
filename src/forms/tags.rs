use serde::Deserialize;
use validator::Validate;

use crate::domain::tag::NewTag;
use crate::domain::types::{TagColor, TagName};
use crate::forms::FormError;

const DEFAULT_TAG_COLOR: &str = "#6c757d";

#[derive(Debug, Default, Deserialize, Validate)]
pub struct TagForm {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[serde(default)]
    pub color: String,
}

impl TryFrom<TagForm> for NewTag {
    type Error = FormError;

    fn try_from(form: TagForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let color = match form.color.trim() {
            "" => DEFAULT_TAG_COLOR,
            color => color,
        };

        Ok(NewTag::new(
            TagName::new(ammonia::clean(&form.name))?,
            TagColor::new(color)?,
        ))
    }
}
