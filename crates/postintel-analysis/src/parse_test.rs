use super::{parse, parse_analysis_only, parse_strategy_script};
use crate::templates::TemplateKind;

const SCRIPT_RESPONSE: &str = "\
【一、 竞品帖子策略分析】
1. **内容定位 (Content Pillar):** 新品发布类内容，主打限量联名。
2. **视觉策略 (Visual Strategy):** 低饱和街拍背景突出产品主体。
3. **文案策略 (Copy Strategy):** 短句钩子加倒计时制造紧迫感。
4. **目标受众 (Target Audience):** 18-30岁潮流消费者。
5. **成功归因 (Success Factors):** 稀缺感与强视觉对比。

【二、 我方爆款参照脚本 (已适配)】
1. **策略适配洞察 (Adaptation Insight):** 沿用倒计时结构，替换为我方新品。
2. **帖子文案 (Post Copy):** 周五上新，数量有限，先到先得。#newdrop
3. **图片生成提示词 (Image Prompts):** 提示词: A minimal street style product shot, soft morning light
";

#[test]
fn full_script_response_recovers_every_field() {
    let fields = parse_strategy_script(SCRIPT_RESPONSE);

    assert_eq!(
        fields.summary,
        "内容定位: 新品发布类内容，主打限量联名。\n\n\
         视觉策略: 低饱和街拍背景突出产品主体。\n\n\
         文案策略: 短句钩子加倒计时制造紧迫感。\n\n\
         目标受众: 18-30岁潮流消费者。"
    );
    assert_eq!(fields.success_factors, "稀缺感与强视觉对比。");
    assert_eq!(fields.strategy_note, "沿用倒计时结构，替换为我方新品。");
    assert_eq!(fields.copy_text, "周五上新，数量有限，先到先得。#newdrop");
    assert_eq!(
        fields.prompt.as_deref(),
        Some("A minimal street style product shot, soft morning light")
    );
    assert!(fields.prompt_sequence.is_none());
}

#[test]
fn ordinal_markers_split_into_a_prompt_sequence() {
    let response = "\
【二、 我方爆款参照脚本 (已适配)】
1. **策略适配洞察:** 保持节奏。
2. **帖子文案:** 文案正文。
3. **图片生成提示词:**
**第一张图片提示词:** 图片提示词: Studio shot of a sneaker on concrete
**第二张图片提示词:** Close-up of stitching detail
第三张图片提示词: Flat lay with accessories
";
    let fields = parse_strategy_script(response);

    assert!(fields.prompt.is_none());
    assert_eq!(
        fields.prompt_sequence.as_deref(),
        Some(
            &[
                "Studio shot of a sneaker on concrete".to_owned(),
                "Close-up of stitching detail".to_owned(),
                "Flat lay with accessories".to_owned(),
            ][..]
        )
    );
}

#[test]
fn ascii_ordinal_markers_are_recognized() {
    let response = "\
【二、 我方爆款参照脚本 (已适配)】
3. **图片生成提示词 (Image Prompts):**
Image 1 Prompt: wide angle cafe interior
Image 2 Prompt: latte art close-up
";
    let fields = parse_strategy_script(response);
    assert_eq!(
        fields.prompt_sequence.as_deref(),
        Some(
            &[
                "wide angle cafe interior".to_owned(),
                "latte art close-up".to_owned(),
            ][..]
        )
    );
}

#[test]
fn full_width_colons_and_unnumbered_labels_are_tolerated() {
    let response = "\
【一、 竞品帖子策略分析】
内容定位： 教程类内容。
成功归因： 实用性强。
";
    let fields = parse_strategy_script(response);
    assert_eq!(fields.summary, "内容定位: 教程类内容。");
    assert_eq!(fields.success_factors, "实用性强。");
}

#[test]
fn missing_sub_fields_stay_empty() {
    let response = "\
【一、 竞品帖子策略分析】
1. **内容定位:** 好物分享。

【二、 我方爆款参照脚本 (已适配)】
2. **帖子文案:** 一段文案。
";
    let fields = parse_strategy_script(response);
    assert_eq!(fields.summary, "内容定位: 好物分享。");
    assert_eq!(fields.success_factors, "");
    assert_eq!(fields.strategy_note, "");
    assert_eq!(fields.copy_text, "一段文案。");
    assert!(fields.prompt.is_none());
    assert!(fields.prompt_sequence.is_none());
}

#[test]
fn empty_prompt_section_yields_neither_branch() {
    let response = "\
【二、 我方爆款参照脚本 (已适配)】
3. **图片生成提示词 (Image Prompts):**
";
    let fields = parse_strategy_script(response);
    assert!(fields.prompt.is_none());
    assert!(fields.prompt_sequence.is_none());
}

#[test]
fn unstructured_response_is_salvaged_into_summary() {
    let response = "  模型完全没有按格式回答，只给了一段自由发挥的文字。  ";
    let fields = parse_strategy_script(response);
    assert_eq!(
        fields.summary,
        "模型完全没有按格式回答，只给了一段自由发挥的文字。"
    );
    assert_eq!(fields.success_factors, "");
    assert_eq!(fields.strategy_note, "");
    assert_eq!(fields.copy_text, "");
    assert!(fields.prompt.is_none());
    assert!(fields.prompt_sequence.is_none());
}

#[test]
fn parsing_is_deterministic() {
    let first = parse(TemplateKind::StrategyScript, SCRIPT_RESPONSE);
    let second = parse(TemplateKind::StrategyScript, SCRIPT_RESPONSE);
    assert_eq!(first, second);
}

const VIDEO_RESPONSE: &str = "\
【一、 帖子文案分析】
开场三秒设置悬念，结尾引导关注。

【二、 标签分析】
标签覆盖品类词与场景词。
* **成功归因:** 前三秒的悬念钩子。

【三、 视频策略分析】
节奏快，每两秒一个画面切换。
";

#[test]
fn video_response_extracts_success_and_strips_its_line() {
    let fields = parse_analysis_only(VIDEO_RESPONSE);

    assert_eq!(fields.success_factors, "前三秒的悬念钩子。");
    assert!(fields.summary.contains("标签覆盖品类词与场景词。"));
    assert!(fields.summary.contains("【三、 视频策略分析】"));
    assert!(!fields.summary.contains("成功归因"));
    assert_eq!(fields.strategy_note, "");
    assert_eq!(fields.copy_text, "");
    assert!(fields.prompt.is_none());
    assert!(fields.prompt_sequence.is_none());
}

#[test]
fn video_response_accepts_the_english_success_label() {
    let response = "\
【二、 标签分析】
Hashtags mix niche and broad reach.
Success factors: a strong three-second hook.
";
    let fields = parse_analysis_only(response);
    assert_eq!(fields.success_factors, "a strong three-second hook.");
    assert!(!fields.summary.contains("Success factors"));
}

#[test]
fn video_response_without_success_line_keeps_everything_in_summary() {
    let response = "【一、 帖子文案分析】\n只有文案分析，没有归因。";
    let fields = parse_analysis_only(response);
    assert_eq!(fields.success_factors, "");
    assert_eq!(fields.summary, response);
}

#[test]
fn template_tagged_entry_point_dispatches() {
    let script = parse(TemplateKind::StrategyScript, SCRIPT_RESPONSE);
    assert!(!script.copy_text.is_empty());

    let video = parse(TemplateKind::AnalysisOnly, VIDEO_RESPONSE);
    assert!(!video.success_factors.is_empty());
    assert!(video.copy_text.is_empty());
}
