// ==========================================
// 序号重排与节移动集成测试
// ==========================================
// 覆盖: 重排后序号为 1..N 且与输入顺序一致; 非法输入不改变任何序号;
//       移动追加到目标章末尾, 原章保留空号; 跨方案移动被拒绝
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use work_schedule::api::ApiError;

fn plan_with_chapters(env: &ApiTestEnv, count: i32) -> (i64, Vec<i64>) {
    let object_id = env.create_object("West", "Sadovaya 12");
    let plan_id = env.create_plan(object_id);
    let ids = (1..=count)
        .map(|n| env.add_chapter(plan_id, &format!("Chapter {}", n), n).chapter_id)
        .collect();
    (plan_id, ids)
}

#[test]
fn test_reorder_chapters_assigns_dense_numbers() {
    let env = ApiTestEnv::new().unwrap();
    let (plan_id, ids) = plan_with_chapters(&env, 4);
    let order = vec![ids[2], ids[0], ids[3], ids[1]];

    let result = env.state.hierarchy_api.reorder_chapters(plan_id, &order).unwrap();
    let listed: Vec<i64> = result.data.iter().map(|c| c.chapter_id).collect();
    assert_eq!(listed, order);

    let numbers = env.chapter_numbers(plan_id);
    assert_eq!(
        numbers,
        vec![(ids[2], 1), (ids[0], 2), (ids[3], 3), (ids[1], 4)]
    );
}

#[test]
fn test_reorder_compacts_sparse_numbers() {
    let env = ApiTestEnv::new().unwrap();
    let object_id = env.create_object("West", "Sadovaya 12");
    let plan_id = env.create_plan(object_id);
    let a = env.add_chapter(plan_id, "A", 10).chapter_id;
    let b = env.add_chapter(plan_id, "B", 40).chapter_id;

    env.state.hierarchy_api.reorder_chapters(plan_id, &[a, b]).unwrap();
    assert_eq!(env.chapter_numbers(plan_id), vec![(a, 1), (b, 2)]);
}

#[test]
fn test_invalid_reorder_changes_nothing() {
    let env = ApiTestEnv::new().unwrap();
    let (plan_id, ids) = plan_with_chapters(&env, 3);
    let (_, foreign) = plan_with_chapters(&env, 1);
    let h = &env.state.hierarchy_api;
    let before = env.snapshot();

    // 数量不符
    let short = h.reorder_chapters(plan_id, &[ids[1], ids[0]]);
    assert!(matches!(short, Err(ApiError::ValidationError(_))));

    // 其他方案的章
    let unknown = h.reorder_chapters(plan_id, &[ids[2], ids[1], foreign[0]]);
    assert!(matches!(unknown, Err(ApiError::ValidationError(_))));

    // 重复
    let dup = h.reorder_chapters(plan_id, &[ids[2], ids[2], ids[0]]);
    assert!(matches!(dup, Err(ApiError::ValidationError(_))));

    assert_eq!(env.snapshot(), before);
}

#[test]
fn test_reorder_missing_plan_is_not_found() {
    let env = ApiTestEnv::new().unwrap();
    assert_not_found(env.state.hierarchy_api.reorder_chapters(404, &[]));
}

#[test]
fn test_reorder_empty_plan_accepts_empty_order() {
    let env = ApiTestEnv::new().unwrap();
    let (plan_id, _) = plan_with_chapters(&env, 0);
    let result = env.state.hierarchy_api.reorder_chapters(plan_id, &[]).unwrap();
    assert!(result.data.is_empty());
}

#[test]
fn test_reorder_subchapters() {
    let env = ApiTestEnv::new().unwrap();
    let (_, chapters) = plan_with_chapters(&env, 1);
    let subs: Vec<i64> = (1..=3)
        .map(|n| env.add_subchapter(chapters[0], &format!("S{}", n), n).subchapter_id)
        .collect();
    let h = &env.state.hierarchy_api;

    h.reorder_subchapters(chapters[0], &[subs[1], subs[2], subs[0]]).unwrap();
    assert_eq!(
        env.subchapter_numbers(chapters[0]),
        vec![(subs[1], 1), (subs[2], 2), (subs[0], 3)]
    );

    let before = env.snapshot();
    let bad = h.reorder_subchapters(chapters[0], &[subs[0], subs[1]]);
    assert!(matches!(bad, Err(ApiError::ValidationError(_))));
    assert_eq!(env.snapshot(), before);
}

#[test]
fn test_move_subchapter_appends_and_leaves_gap() {
    let env = ApiTestEnv::new().unwrap();
    let (plan_id, chapters) = plan_with_chapters(&env, 2);
    let (from, to) = (chapters[0], chapters[1]);
    let s1 = env.add_subchapter(from, "S1", 1).subchapter_id;
    let s2 = env.add_subchapter(from, "S2", 2).subchapter_id;
    let s3 = env.add_subchapter(from, "S3", 3).subchapter_id;
    let t1 = env.add_subchapter(to, "T1", 1).subchapter_id;
    let t2 = env.add_subchapter(to, "T2", 2).subchapter_id;

    let moved = env.state.hierarchy_api.move_subchapter(s2, to, plan_id).unwrap();
    assert_eq!(moved.data.from_chapter_id, from);
    assert_eq!(moved.data.to_chapter_id, to);
    assert_eq!(moved.data.new_number, 3);

    let sub = env.state.hierarchy_api.get_subchapter(s2).unwrap();
    assert_eq!(sub.chapter_id, to);

    // 原章不重新编号
    assert_eq!(env.subchapter_numbers(from), vec![(s1, 1), (s3, 3)]);
    assert_eq!(env.subchapter_numbers(to), vec![(t1, 1), (t2, 2), (s2, 3)]);
}

#[test]
fn test_move_within_own_chapter_keeps_numbers_unique() {
    let env = ApiTestEnv::new().unwrap();
    let (plan_id, chapters) = plan_with_chapters(&env, 1);
    let s1 = env.add_subchapter(chapters[0], "S1", 1).subchapter_id;
    let s2 = env.add_subchapter(chapters[0], "S2", 2).subchapter_id;

    let moved = env
        .state
        .hierarchy_api
        .move_subchapter(s1, chapters[0], plan_id)
        .unwrap();
    assert_eq!(moved.data.from_chapter_id, chapters[0]);
    assert_eq!(moved.data.new_number, 3);

    assert_eq!(env.subchapter_numbers(chapters[0]), vec![(s2, 2), (s1, 3)]);
}

#[test]
fn test_move_keeps_work_types_with_subchapter() {
    let env = ApiTestEnv::new().unwrap();
    let seeded = env.seed_plan();
    let sub = seeded.subchapters[0];

    env.state
        .hierarchy_api
        .move_subchapter(sub, seeded.chapters[1], seeded.plan_id)
        .unwrap();

    let work_types = env.state.hierarchy_api.list_work_types(sub).unwrap();
    assert_eq!(work_types.len(), 1);
    assert_eq!(work_types[0].work_type_id, seeded.work_types[0]);
}

#[test]
fn test_move_to_empty_chapter_gets_number_one() {
    let env = ApiTestEnv::new().unwrap();
    let (plan_id, chapters) = plan_with_chapters(&env, 2);
    let s = env.add_subchapter(chapters[0], "S", 5).subchapter_id;

    let moved = env
        .state
        .hierarchy_api
        .move_subchapter(s, chapters[1], plan_id)
        .unwrap();
    assert_eq!(moved.data.new_number, 1);
}

#[test]
fn test_cross_plan_move_is_rejected() {
    let env = ApiTestEnv::new().unwrap();
    let a = env.seed_plan();
    let b = env.seed_plan();
    let h = &env.state.hierarchy_api;
    let before = env.snapshot();

    // 目标章属于其他方案
    let result = h.move_subchapter(a.subchapters[0], b.chapters[0], a.plan_id);
    assert!(matches!(result, Err(ApiError::CrossPlanMove(_))));

    // 节不属于给定方案
    let result = h.move_subchapter(a.subchapters[0], b.chapters[0], b.plan_id);
    assert!(matches!(result, Err(ApiError::CrossPlanMove(_))));

    assert_eq!(env.snapshot(), before);
}

#[test]
fn test_move_missing_entities() {
    let env = ApiTestEnv::new().unwrap();
    let seeded = env.seed_plan();
    let h = &env.state.hierarchy_api;

    assert_not_found(h.move_subchapter(999, seeded.chapters[1], seeded.plan_id));
    assert_not_found(h.move_subchapter(seeded.subchapters[0], 999, seeded.plan_id));
}

#[test]
fn test_lock_is_checked_before_order_validation() {
    let env = ApiTestEnv::new().unwrap();
    let (plan_id, ids) = plan_with_chapters(&env, 2);
    env.state.schedule_api.lock_plan(plan_id).unwrap();

    // 非法顺序 + 锁定: 报告锁定
    let result = env.state.hierarchy_api.reorder_chapters(plan_id, &[ids[0]]);
    assert!(matches!(result, Err(ApiError::PlanLocked(_))));
}
