//! Fixed domain knowledge embedded in every suggestion request.

pub const COLOR_PALETTE: &[&str] = &[
    "ホワイト",
    "ブラック",
    "グレー",
    "ネイビー",
    "ベージュ",
    "ブラウン",
    "カーキ",
    "オリーブ",
    "ブルー",
    "ライトブルー",
    "レッド",
    "ボルドー",
    "ピンク",
    "オレンジ",
    "イエロー",
    "グリーン",
    "パープル",
    "その他",
];

pub const FASHION_MANUAL: &str = r#"## 1. シルエットの基本
- Iライン: 上下ともに細身でまとめ、縦の直線を強調する。きれいめ・モードに向き、身長を高く見せる。
- Aライン: トップスをコンパクトに、ボトムスに広がりを持たせる。フレアスカートやワイドパンツで作る。
- Yライン: トップスにボリュームを持たせ、ボトムスを細身にする。オーバーサイズのトップスにはスキニーやテーパードを合わせる。
- 上下ともにボリュームを出す場合は、靴・小物・素材でどこか一箇所を引き締める。

## 2. 色合わせの基本
- コーディネート全体の色数は三色以内を目安にする。
- 配色の比率はベースカラー70%、アソートカラー25%、アクセントカラー5%。
- 色相環で隣り合う色(類似色)は調和しやすく、向かい合う色(補色)は互いを引き立てるが面積を絞る。
- 無彩色(白・黒・グレー)はどの色とも合わせやすく、有彩色を一色だけ足すと洗練される。

## 3. 色合わせの実践テクニック(トーン)
- トーン統一: 色相が違っても同じトーン(パステル同士、ダーク同士など)でまとめると統一感が出る。
- トーンずらし(トーンオントーン): 同じ色相で明るさを変えて重ねる。ネイビーとライトブルーなど。
- セパレーション: ぶつかる色の間に無彩色やベージュを挟み、境界をはっきりさせる。ベルトやインナーを使う。
- 原色(ビビッド)は主役一点に絞り、残りを無彩色か安静色(ダーク)で支える。
- 脱色(くすみ/グレイッシュ)は同系の脱色トーンで揃えると大人っぽく、白を足すと軽さが出る。
- 明星色(パステル/淡い)は甘くなりすぎないよう、黒やネイビーなどダークトーンで引き締める。

## 4. 素材のバランス
- 光沢のある素材とマットな素材を組み合わせると立体感が出る。
- 重い素材(レザー、ウール)と軽い素材(コットン、リネン)を上下で分けると季節感を調整しやすい。
- カジュアルな素材(デニム、スウェット)にはきれいめの素材(ウール、レザーシューズ)を一点入れて大人っぽく仕上げる。

## 5. テイストの配分
- きれいめ7:カジュアル3を基本とし、ストリートやモードは小物や靴で取り入れる。
- 主役アイテムが個性的な場合は、他のアイテムをベーシックにして主役を引き立てる。
"#;
