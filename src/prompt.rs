use serde_json::{json, Value};

use crate::models::ItemDescriptor;

/// Keys the text model must return, in schema order.
pub const RESPONSE_FIELDS: [&str; 6] = [
    "title",
    "description",
    "silhouetteTheory",
    "colorTheory",
    "items",
    "visualPrompt",
];

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRequest {
    pub system_instruction: String,
    pub user_prompt: String,
    pub response_schema: Value,
}

pub fn build_suggestion_request(item: &ItemDescriptor, manual: &str) -> SuggestionRequest {
    SuggestionRequest {
        system_instruction: build_system_instruction(manual),
        user_prompt: build_user_prompt(item),
        response_schema: response_schema(),
    }
}

fn build_system_instruction(manual: &str) -> String {
    format!(
        "あなたはプロのファッションスタイリストです。\n\
        提供された「ファッションマニュアル」の理論(シルエット、色合わせ、素材バランス)を厳密に適用し、\
        ユーザーが持っているアイテムに最適なトータルコーディネートを提案してください。\n\n\
        # ファッションマニュアル\n{manual}\n\n\
        # 制約\n\
        - ユーザーのアイテムを必ず主役にしてください。\n\
        - なぜそのコーディネートが良いのか、マニュアルの理論(Iライン、Aライン、Yライン、色相環など)を引用して論理的に説明してください。\n\
        - 「色合わせの実践テクニック」に基づき、ユーザーのアイテムの「トーン」を考慮した提案を行ってください。\n\
        - visualPromptは画像生成AIに入力するための英語のプロンプトです。モデルの服装、ポーズ、背景を含めて具体的に記述してください。"
    )
}

fn build_user_prompt(item: &ItemDescriptor) -> String {
    format!(
        "ユーザーの所持アイテム情報:\n\
        - カテゴリ: {category}\n\
        - カラー: {color}\n\
        - トーン: {tone}\n\
        - 属性: {attribute}\n\
        - デザイン: {design}\n\
        - 素材: {material}\n\
        - 身幅: {width}\n\
        - 着丈: {length}\n\
        - シルエット: {silhouette}\n\n\
        このアイテムを使った最高におしゃれなコーディネートを提案してください。\n\
        特にトーンの分類({tone})に基づいた色合わせのテクニック(トーンずらし、トーン統一、セパレーションなど)を活用し、解説に含めてください。",
        category = item.category,
        color = item.color,
        tone = item.tone,
        attribute = item.attribute,
        design = item.design,
        material = item.material,
        width = item.width,
        length = item.length,
        silhouette = item.silhouette,
    )
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING", "description": "コーディネートのタイトル" },
            "description": { "type": "STRING", "description": "コーディネートの全体的な解説" },
            "silhouetteTheory": { "type": "STRING", "description": "採用したシルエット理論とその理由" },
            "colorTheory": { "type": "STRING", "description": "採用した配色理論(トーン理論含む)とその理由" },
            "items": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "合わせる他のアイテムのリスト(具体的アイテム名)"
            },
            "visualPrompt": {
                "type": "STRING",
                "description": "A detailed English description of the person wearing the full outfit for image generation. Include details about the clothing textures, fit, colors, and a neutral fashion studio background."
            }
        },
        "required": RESPONSE_FIELDS,
    })
}
