//! `ja / zh / en` display labels for categories and subcategories.

const CATEGORY_NAMES: &[(&str, &str, &str)] = &[
    ("トップス", "上衣", "Tops"),
    ("アウター", "外套", "Outerwear"),
    ("ワンピース", "連衣裙", "Dresses"),
    ("ボトムス", "下裝", "Bottoms"),
    ("シューズ", "鞋子", "Shoes"),
    ("バッグ・カバン", "包包", "Bags"),
    ("アクセサリー", "配件", "Accessories"),
    ("セットアイテム", "套裝", "Sets"),
];

const SUBCATEGORY_NAMES: &[(&str, &str, &str)] = &[
    ("ニット", "針織", "Knitwear"),
    ("シャツ・ブラウス", "襯衫 & 襯衣", "Shirts & Blouses"),
    ("カットソー", "縫製 T 恤", "Cut and Sewn Tops"),
    ("スウェット", "運動衫", "Sweatshirts"),
    ("プリントTシャツ", "印花 T 恤", "Printed T-Shirts"),
    ("Tシャツ[無地]", "素色 T 恤", "Plain T-Shirts"),
    ("パーカー", "帽 T", "Hoodies"),
    ("タンクトップ・キャミソール", "背心和吊帶背心", "Tanks & Camisoles"),
    ("ベスト", "背心", "Vests"),
    ("トップスセット", "上衣套裝", "Tops Sets"),
    ("ベアトップ・チューブトップ", "抹胸 & 管狀上衣", "Tube Tops"),
    ("トップス_その他", "其他 (上衣)", "Others (Tops)"),
    ("ジャケット", "夾克", "Jackets"),
    ("カーディガン", "羊毛衫", "Cardigans"),
    ("コート", "大衣", "Coats"),
    ("アウターセット", "外套套裝", "Outerwear Sets"),
    ("アウター_その他", "其他 (外套)", "Others (Outerwear)"),
    ("柄", "圖案", "Patterned"),
    ("無地", "素色", "Solid Colors"),
    ("ニットワンピース", "針織連衣裙", "Knit Dresses"),
    ("ロングワンピース", "長款連衣裙", "Long Dresses"),
    ("シャツワンピース", "襯衫式連衣裙", "Shirt Dresses"),
    ("キャミワンピース", "吊帶連衣裙", "Camisole Dresses"),
    ("オールインワン・サロペット", "連身褲 & 背帶褲", "Jumpsuits & Overalls"),
    ("ジャンパースカート", "套頭背心裙", "Pinafore Dresses"),
    ("浴衣", "浴衣/和服", "Wafuku"),
    ("ワンピース_その他", "其他 (連衣裙)", "Others (Dresses)"),
    ("パンツ・デニム", "褲子 & 牛仔褲", "Pants & Denim"),
    ("ショートパンツ", "短褲", "Shorts"),
    ("スカート", "裙子", "Skirts"),
    ("マーメイドスカート", "人魚裙", "Mermaid Skirt"),
    ("フレアスカート", "喇叭裙", "Flare Skirt"),
    ("ミニスカート", "迷你裙", "Mini Skirt"),
    ("ボトムスセット", "下裝套裝", "Bottoms Sets"),
    ("ボトムス_その他", "其他 (下裝)", "Others (Bottoms)"),
    ("パンプス", "高跟鞋", "Heels"),
    ("サンダル", "涼鞋", "Sandals"),
    ("ショートブーツ・ブーティ", "短靴", "Short Boots"),
    ("ロングブーツ", "長靴", "Long Boots"),
    ("スニーカー", "運動鞋", "Sneakers"),
    ("ローファー", "樂福鞋", "Loafers"),
    ("シューズ_その他", "其他 (鞋子)", "Others (Shoes)"),
    ("ショルダーバッグ", "肩背包", "Shoulder Bags"),
    ("ハンドバッグ", "手提包", "Handbags"),
    ("リュック", "背包", "Backpacks"),
    ("トートバッグ", "托特包", "Tote Bags"),
    ("クラッチバッグ", "手拿包", "Clutches"),
    ("かごバッグ", "編織包", "Woven Bags"),
    ("ポシェット", "小肩包", "Pouches"),
    ("バッグ・カバン_その他", "其他 (包包)", "Others (Bags)"),
    ("ピアス・リング", "耳環 & 戒指", "Earrings & Rings"),
    ("ネックレス", "項鍊", "Necklaces"),
    ("ベルト", "腰帶", "Belts"),
    ("ブレス", "手鐲", "Bracelets"),
    ("帽子", "帽子", "Hats"),
    ("ヘッドアクセ", "頭部配件", "Hair Accessories"),
    ("スカーフ", "圍巾", "Scarves"),
    ("ストール・マフラー", "披肩 & 圍脖", "Stoles & Mufflers"),
    ("レッグウェア", "襪子", "Legwear"),
    ("インナー", "內搭", "Innerwear"),
    ("メガネ・サングラス", "眼鏡 & 太陽鏡", "Glasses & Sunglasses"),
    ("時計", "手錶", "Watches"),
    ("アクセサリー_その他", "其他 (配件)", "Others (Accessories)"),
    ("セットアップ", "套裝", "Sets"),
    ("その他セット", "其他套裝", "Other Sets"),
    ("セットアイテム_その他", "其他 (套裝)", "Others (Sets)"),
    ("ルームウェア", "居家服", "Loungewear"),
];

fn lookup(table: &[(&str, &str, &str)], ja: &str) -> String {
    table
        .iter()
        .find(|(key, _, _)| *key == ja)
        .map(|(key, zh, en)| format!("{} / {} / {}", key, zh, en))
        .unwrap_or_else(|| ja.to_string())
}

pub fn category_display_name(category: &str) -> String {
    lookup(CATEGORY_NAMES, category)
}

pub fn subcategory_display_name(subcategory: &str) -> String {
    lookup(SUBCATEGORY_NAMES, subcategory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryTaxonomy;

    #[test]
    fn known_labels_are_trilingual() {
        assert_eq!(category_display_name("トップス"), "トップス / 上衣 / Tops");
        assert_eq!(subcategory_display_name("ニット"), "ニット / 針織 / Knitwear");
    }

    #[test]
    fn unknown_labels_pass_through() {
        assert_eq!(category_display_name("インテリア"), "インテリア");
    }

    #[test]
    fn every_builtin_subcategory_has_a_name() {
        for def in CategoryTaxonomy::builtin().categories {
            assert_ne!(category_display_name(&def.name), def.name);
            for sub in &def.subcategories {
                assert_ne!(&subcategory_display_name(sub), sub, "missing name for {sub}");
            }
        }
    }
}
