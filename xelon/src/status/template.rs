use super::{classify, run_wait, StatusWaitError, UnknownStateCode};
use crate::api::templates::Template;
use crate::api::{ApiError, Client};
use crate::provider_data::XelonProviderData;
use std::fmt;
use tfretry::{Context, Refresh};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateState {
    Creating,
    Ready,
}

impl TryFrom<i64> for TemplateState {
    type Error = UnknownStateCode;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Creating),
            1 => Ok(Self::Ready),
            code => Err(UnknownStateCode {
                kind: "template",
                code,
            }),
        }
    }
}

impl fmt::Display for TemplateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Creating => "creating",
            Self::Ready => "ready",
        })
    }
}

pub async fn template_state(
    client: &Client,
    template_id: &str,
) -> Result<Refresh<Template, TemplateState>, ApiError> {
    let template = client.templates().get(template_id).await?;
    Ok(classify(template, |t| TemplateState::try_from(t.status)))
}

pub async fn wait_template_ready(
    ctx: &Context,
    data: &XelonProviderData,
    template_id: &str,
) -> Result<Template, StatusWaitError> {
    let conf = data
        .wait
        .conf([TemplateState::Creating], [TemplateState::Ready])
        .mask_errors_as(TemplateState::Creating, ApiError::is_transient_provisioning);

    run_wait(ctx, conf, "template", template_id, "become ready", || {
        template_state(&data.client, template_id)
    })
    .await
}
