//! Startup tasks: demo catalogue seeding.

use crate::{
    models::{DishFilter, NewDish},
    services::DishService,
    Error, Result,
};

/// Built-in demo catalogue, banquet dishes first, then home cooking.
pub const SEED_DISHES: &[(&str, &str)] = &[
    // Banquet
    ("佛跳墙", "台风天锁门独享，狂风在外，福气在罐。"),
    ("鲍汁百灵菇", "初雪落地时吃，鲜掉眉毛，暖到心底。"),
    ("龙虾刺身船", "高温预警日，上船即入海，一口降温5℃。"),
    ("红烧大鲍翅", "寒潮蓝色预警，让鲍翅给你加一层保暖内衣。"),
    ("清蒸东星斑", "春雷第一声，蒸条“星”运，一年红红火火。"),
    ("黑松露北京烤鸭", "霜降当天，鸭皮脆到像踩碎薄冰，仪式感拉满。"),
    ("金汤花胶鸡", "回南天湿到发“霉”，花胶帮你把皮肤拉回满水位。"),
    ("蒜蓉粉丝蒸帝王蟹", "极光夜加餐，蟹腿比筷子长，吃完抬头继续追光。"),
    ("葱烧海参", "沙尘暴出门难，海参先给你把肺润成绿洲。"),
    ("麻辣牛油火锅（和牛版）", "冰雹噼啪响，屋内牛油翻滚，冰火两重天。"),
    // Home cooking
    ("番茄炒蛋", "小雨淅沥，红黄配色像窗外彩虹被搬进锅里。"),
    ("青椒土豆丝", "大雾天能见度低，咔嚓一口脆响，开路！"),
    ("可乐鸡翅", "闷热午后，甜咸气泡在舌尖打雷，比空调先降温。"),
    ("麻婆豆腐", "雷暴夜，一勺麻辣闪电，瞬间劈开味蕾。"),
    ("糖醋排骨", "冻雨路滑，酸甜平衡帮你找回身体的重心。"),
    ("蒜蓉空心菜", "干旱日一口绿，咔嚓脆响，像给嗓子浇了一场及时雨。"),
    ("腊肉炒蒜苗", "暴风雪夜，腊肉烟熏味把屋子瞬间变成小木屋。"),
    ("酸辣土豆丝", "秋老虎发威，酸爽比电扇先抵达灵魂。"),
    ("紫菜蛋花汤", "晴空万里，喝口“海”的味道，把蓝天装进胃里。"),
    ("葱油拌面", "梅雨季晾不干衣服，却晾得干一碗热腾腾的灵魂。"),
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

/// Insert every seed dish whose name is not taken yet.
///
/// Existing names are skipped, so running the seeder twice is harmless.
/// A concurrent insert of the same name counts as skipped as well.
pub async fn seed_dishes(service: &DishService) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for (name, description) in SEED_DISHES {
        match service.get_by_name(name).await {
            Ok(_) => {
                report.skipped += 1;
                continue;
            }
            Err(Error::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        match service
            .create(NewDish::new(*name).with_description(*description))
            .await
        {
            Ok(_) => report.created += 1,
            Err(Error::AlreadyExists(_)) => report.skipped += 1,
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        created = report.created,
        skipped = report.skipped,
        "Seed dishes applied"
    );
    Ok(report)
}

/// First `count` dishes in id order, for a post-seed preview.
pub async fn preview(service: &DishService, count: i64) -> Result<Vec<crate::models::Dish>> {
    service.list(&DishFilter::default().page(count, 0)).await
}
