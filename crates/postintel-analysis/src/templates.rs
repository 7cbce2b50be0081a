//! Prompt templates, keyed by post kind.
//!
//! Two templates exist: `StrategyScript` for image and gallery posts
//! (full strategy breakdown plus an adapted script for our own account)
//! and `AnalysisOnly` for video posts (no script generation, the video
//! itself carries the format). Mixed galleries have no template and are
//! rejected up front.

use postintel_core::PostKind;

use crate::AnalysisError;

/// Which prompt template (and therefore which response parser) applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Image / gallery: strategy analysis + adapted reference script.
    StrategyScript,
    /// Video: analysis only.
    AnalysisOnly,
}

impl TemplateKind {
    /// Maps a post kind to its template.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnsupportedKind`] for mixed galleries,
    /// which neither template covers.
    pub fn for_post(kind: PostKind) -> Result<Self, AnalysisError> {
        match kind {
            PostKind::Image | PostKind::Gallery => Ok(TemplateKind::StrategyScript),
            PostKind::Video => Ok(TemplateKind::AnalysisOnly),
            PostKind::MixedGallery => Err(AnalysisError::UnsupportedKind {
                kind: kind.as_code().to_owned(),
            }),
        }
    }
}

/// Renders the prompt for the given template and post caption.
#[must_use]
pub fn build_prompt(template: TemplateKind, caption: &str) -> String {
    match template {
        TemplateKind::StrategyScript => strategy_script_prompt(caption),
        TemplateKind::AnalysisOnly => analysis_only_prompt(caption),
    }
}

fn strategy_script_prompt(caption: &str) -> String {
    format!(
        "你是一位资深的社交媒体内容策略专家。请仔细分析附带的竞品帖子图片和下方的帖子文案，\
         然后严格按照以下结构输出分析结果，保留所有小节标题和编号：\n\
         \n\
         【一、 竞品帖子策略分析】\n\
         1. **内容定位 (Content Pillar):** 这条帖子属于哪类内容，核心卖点是什么。\n\
         2. **视觉策略 (Visual Strategy):** 画面构图、色调、出镜元素以及它们服务的目的。\n\
         3. **文案策略 (Copy Strategy):** 文案结构、钩子、行动号召和标签的使用方式。\n\
         4. **目标受众 (Target Audience):** 这条内容在对谁说话，满足了什么需求。\n\
         5. **成功归因 (Success Factors):** 这条帖子表现好的最关键原因。\n\
         \n\
         【二、 我方爆款参照脚本 (已适配)】\n\
         1. **策略适配洞察 (Adaptation Insight):** 如何把上述策略迁移到我方账号。\n\
         2. **帖子文案 (Post Copy):** 可直接发布的完整文案，含标签。\n\
         3. **图片生成提示词 (Image Prompts):** 用于图片生成模型的英文提示词。\
         如果需要多张图片，请分别以 \"第一张图片提示词:\"、\"第二张图片提示词:\" 开头逐张给出；\
         单张图片直接给出提示词即可。\n\
         \n\
         竞品帖子文案如下：\n{caption}"
    )
}

fn analysis_only_prompt(caption: &str) -> String {
    format!(
        "你是一位资深的短视频内容策略专家。请仔细分析附带的竞品视频和下方的帖子文案，\
         然后严格按照以下结构输出分析结果，保留所有小节标题：\n\
         \n\
         【一、 帖子文案分析】\n\
         分析文案的结构、钩子和行动号召。\n\
         \n\
         【二、 标签分析】\n\
         分析标签组合的覆盖面和意图，并在本节末尾单独给出一行：\n\
         * **成功归因:** 这条视频表现好的最关键原因。\n\
         \n\
         【三、 视频策略分析】\n\
         分析视频的节奏、画面语言和留住观众的手法。\n\
         \n\
         竞品帖子文案如下：\n{caption}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_and_gallery_use_strategy_script() {
        assert_eq!(
            TemplateKind::for_post(PostKind::Image).unwrap(),
            TemplateKind::StrategyScript
        );
        assert_eq!(
            TemplateKind::for_post(PostKind::Gallery).unwrap(),
            TemplateKind::StrategyScript
        );
    }

    #[test]
    fn video_uses_analysis_only() {
        assert_eq!(
            TemplateKind::for_post(PostKind::Video).unwrap(),
            TemplateKind::AnalysisOnly
        );
    }

    #[test]
    fn mixed_gallery_is_rejected() {
        let err = TemplateKind::for_post(PostKind::MixedGallery).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::UnsupportedKind { kind } if kind == "Sidecar_video"
        ));
    }

    #[test]
    fn prompts_embed_the_caption_and_section_headings() {
        let p = build_prompt(TemplateKind::StrategyScript, "new drop friday");
        assert!(p.contains("new drop friday"));
        assert!(p.contains("【一、 竞品帖子策略分析】"));
        assert!(p.contains("【二、 我方爆款参照脚本 (已适配)】"));

        let p = build_prompt(TemplateKind::AnalysisOnly, "watch till the end");
        assert!(p.contains("watch till the end"));
        assert!(p.contains("【二、 标签分析】"));
    }
}
