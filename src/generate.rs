use chrono::{Duration, Local};
use rand::Rng;

use crate::extract::news::categorize_title;
use crate::records::{RawBook, RawCourse, RawNews, RawNotice, Scalar};

// Fixed vocabularies for synthetic records. Content is sampled, structure is
// not: every generated record carries the full field set of its type.

const BOOK_TITLES: &[&str] = &[
    "北京大学校史", "燕园建筑", "北大风物", "京师大学堂纪事", "红楼忆往",
    "蔡元培与北大", "胡适北大文集", "李大钊研究文集", "五四运动与北大",
    "未名湖畔", "博雅塔影", "北大精神", "学术的北大", "北大人物志",
    "北大讲座精选", "燕园史话", "北大学人", "北大传统", "北大记忆",
    "燕园景观", "北大历史", "北大文化", "北大教育", "北大科研",
    "北大与中国现代教育", "北大人物传", "燕园建筑艺术", "北大校史资料",
    "北大名人录", "北大往事",
];

const BOOK_AUTHORS: &[&str] = &[
    "北京大学校史馆", "陈平原", "钱理群", "温儒敏", "张颐武",
    "王余光", "戴锦华", "韩毓海", "孔庆东", "李零",
    "欧阳哲生", "夏晓虹", "陈来", "阎步克", "邓小南",
    "北京大学档案馆", "北大校史研究室", "燕园文化遗产保护协会",
];

// The campus press is listed three times so it dominates the sample.
const BOOK_PUBLISHERS: &[&str] = &[
    "北京大学出版社", "北京大学出版社", "北京大学出版社",
    "人民出版社", "中华书局", "商务印书馆", "清华大学出版社",
    "高等教育出版社", "中国社会科学出版社",
];

const BOOK_CATEGORIES: &[&str] = &[
    "校史研究", "人物传记", "建筑艺术", "文化教育", "学术研究",
    "历史资料", "校园文化", "教育研究", "社会科学",
];

const NEWS_TEMPLATES: &[&str] = &[
    "北京大学召开{subject}会议",
    "北大{subject}研究成果在{journal}发表",
    "{department}举办{activity}活动",
    "北京大学{project}项目取得新进展",
    "{expert}教授做客北大讲座",
    "北大与{institution}签署合作协议",
    "北京大学{achievement}获奖",
    "北大{activity}活动圆满举行",
    "北京大学{field}研究取得突破",
    "{leader}视察北京大学",
];

const NEWS_SUBJECTS: &[&str] = &["学术", "科研", "教学", "国际交流", "人才培养", "学科建设"];

const NEWS_DEPARTMENTS: &[&str] = &[
    "计算机学院", "数学科学学院", "物理学院", "化学学院", "生命科学学院",
    "经济学院", "法学院", "光华管理学院", "新闻与传播学院", "国际关系学院",
];

const NEWS_JOURNALS: &[&str] = &["《自然》", "《科学》", "《细胞》", "《美国科学院院刊》", "《中国社会科学》"];

const NEWS_ACTIVITIES: &[&str] = &["学术讲座", "国际会议", "文化节", "创新大赛", "学术论坛"];

const EXPERT_SURNAMES: &[&str] = &["张", "李", "王", "刘", "陈"];

const PARTNER_INSTITUTIONS: &[&str] = &["哈佛大学", "牛津大学", "清华大学", "中国科学院"];

const ACHIEVEMENTS: &[&str] = &["自然科学奖", "科技进步奖", "教学成果奖"];

const RESEARCH_FIELDS: &[&str] = &["人工智能", "量子计算", "生物医学", "环境保护"];

const LEADER_AGENCIES: &[&str] = &["教育部", "科技部", "北京市"];

const COURSE_NAMES: &[&str] = &[
    "计算概论", "数据结构与算法", "人工智能导论", "机器学习", "深度学习",
    "高等数学", "线性代数", "概率统计", "大学物理", "普通化学",
    "中国通史", "世界文明史", "哲学导论", "经济学原理", "法学原理",
    "文学概论", "艺术导论", "社会学概论", "心理学导论", "政治学原理",
    "计算机组成", "操作系统", "计算机网络", "数据库系统", "软件工程",
    "数字电路", "信号处理", "自动控制", "通信原理", "电子技术",
];

const COURSE_DEPARTMENTS: &[&str] = &[
    "计算机科学与技术学院", "数学科学学院", "物理学院", "化学与分子工程学院",
    "生命科学学院", "城市与环境学院", "心理与认知科学学院", "中国语言文学系",
    "历史学系", "哲学系", "国际关系学院", "法学院", "经济学院",
    "光华管理学院", "新闻与传播学院", "艺术学院", "社会学系",
];

const COURSE_TEACHERS: &[&str] = &[
    "张明", "李华", "王强", "刘洋", "陈静", "赵宇", "周涛", "吴帆",
    "郑洁", "孙磊", "钱勇", "冯军", "韩梅", "杨光", "朱红", "秦峰",
];

const COURSE_CREDITS: &[i64] = &[1, 2, 3, 4];
const COURSE_HOURS: &[i64] = &[16, 32, 48, 64];
const COURSE_SEMESTERS: &[&str] = &["2024春季", "2024秋季", "2025春季"];

const NOTICE_TYPES: &[&str] = &[
    "学术讲座通知", "会议通知", "放假通知", "选课通知", "考试安排",
    "成绩查询通知", "奖学金申请", "项目申报", "招聘信息", "活动通知",
    "系统维护通知", "校园施工通知", "安全提示", "防疫通知", "缴费通知",
];

fn pick<'a>(rng: &mut impl Rng, items: &'a [&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

fn now_stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Synthetic book records sampled from the fixed vocabularies.
pub fn books(count: usize, rng: &mut impl Rng) -> Vec<RawBook> {
    let crawl_time = now_stamp();
    (0..count)
        .map(|i| RawBook {
            book_id: format!("gen_book_{:04}", i + 1),
            title: Some(format!("{} ({})", pick(rng, BOOK_TITLES), i + 1)),
            author: Some(pick(rng, BOOK_AUTHORS).to_string()),
            publisher: Some(pick(rng, BOOK_PUBLISHERS).to_string()),
            category: Some(pick(rng, BOOK_CATEGORIES).to_string()),
            year: Some((2018 + (i as i64 % 6)).to_string()),
            isbn: Some(format!("978-7-301-{:05}", 25000 + i)),
            description: Some("北京大学相关研究著作".to_string()),
            source: Some("北京大学文献资料".to_string()),
            record_type: "book".to_string(),
            crawl_time: Some(crawl_time.clone()),
        })
        .collect()
}

fn news_title(i: usize, rng: &mut impl Rng) -> String {
    pick(rng, NEWS_TEMPLATES)
        .replace("{subject}", pick(rng, NEWS_SUBJECTS))
        .replace("{department}", pick(rng, NEWS_DEPARTMENTS))
        .replace("{journal}", pick(rng, NEWS_JOURNALS))
        .replace("{activity}", pick(rng, NEWS_ACTIVITIES))
        .replace("{project}", &format!("重大科研项目{}", i % 10 + 1))
        .replace("{expert}", &format!("{}教授", pick(rng, EXPERT_SURNAMES)))
        .replace("{institution}", pick(rng, PARTNER_INSTITUTIONS))
        .replace("{achievement}", pick(rng, ACHIEVEMENTS))
        .replace("{field}", pick(rng, RESEARCH_FIELDS))
        .replace("{leader}", &format!("{}领导", pick(rng, LEADER_AGENCIES)))
}

/// Synthetic news records, back-dated up to a year.
pub fn news(count: usize, rng: &mut impl Rng) -> Vec<RawNews> {
    let crawl_time = now_stamp();
    (0..count)
        .map(|i| {
            let title = news_title(i, rng);
            let days_ago: i64 = rng.random_range(1..=365);
            let date = (Local::now() - Duration::days(days_ago))
                .format("%Y-%m-%d")
                .to_string();
            RawNews {
                news_id: format!("gen_news_{:04}", i + 1),
                summary: Some(format!(
                    "北京大学相关动态：{title}。这是基于真实校园活动的模拟新闻内容。"
                )),
                content: Some(
                    "详细内容：北京大学在相关领域取得了新的进展和成果。这条新闻反映了学校的学术活动和校园动态。"
                        .to_string(),
                ),
                url: None,
                date: Some(date),
                category: Some(categorize_title(&title).to_string()),
                source: Some("北京大学新闻网（模拟）".to_string()),
                record_type: "news".to_string(),
                crawl_time: Some(crawl_time.clone()),
                title: Some(title),
            }
        })
        .collect()
}

/// Synthetic course records; courses have no crawlable source and are always
/// fully generated.
pub fn courses(count: usize, rng: &mut impl Rng) -> Vec<RawCourse> {
    let crawl_time = now_stamp();
    (0..count)
        .map(|i| {
            let mut name = pick(rng, COURSE_NAMES).to_string();
            if i > 0 && i % 10 == 0 {
                name = format!("高级{name}");
            }
            let description = format!("北京大学{name}课程，旨在培养学生相关能力。");
            RawCourse {
                course_id: format!("course_{:04}", i + 1),
                code: Some(format!("PKU{:04}", 1000 + i)),
                teacher: Some(format!("{}教授", pick(rng, COURSE_TEACHERS))),
                department: Some(pick(rng, COURSE_DEPARTMENTS).to_string()),
                credit: Some(Scalar::Int(
                    COURSE_CREDITS[rng.random_range(0..COURSE_CREDITS.len())],
                )),
                hours: Some(Scalar::Int(
                    COURSE_HOURS[rng.random_range(0..COURSE_HOURS.len())],
                )),
                semester: Some(pick(rng, COURSE_SEMESTERS).to_string()),
                description: Some(description),
                source: Some("北京大学课程信息".to_string()),
                record_type: "course".to_string(),
                crawl_time: Some(crawl_time.clone()),
                name: Some(name),
            }
        })
        .collect()
}

/// Synthetic notice records. `start` continues the id sequence after any
/// crawled notices so ids stay unique within the type.
pub fn notices(count: usize, start: usize, rng: &mut impl Rng) -> Vec<RawNotice> {
    let crawl_time = now_stamp();
    (0..count)
        .map(|i| {
            let notice_type = pick(rng, NOTICE_TYPES);
            let days_offset: i64 = rng.random_range(-30..=30);
            let date = (Local::now() + Duration::days(days_offset))
                .format("%Y-%m-%d")
                .to_string();
            RawNotice {
                notice_id: format!("notice_{:04}", start + i + 1),
                title: Some(format!("关于{}的通知（{}）", notice_type, i + 1)),
                content: Some(format!(
                    "请各位师生注意：{notice_type}的具体安排和要求。详细内容请查看相关链接或咨询负责部门。"
                )),
                url: None,
                date: Some(date),
                category: Some(notice_type.to_string()),
                source: Some("北京大学相关部门".to_string()),
                record_type: "notice".to_string(),
                crawl_time: Some(crawl_time.clone()),
            }
        })
        .collect()
}
