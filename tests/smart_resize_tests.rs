mod common;

#[cfg(test)]
mod tests {
    use super::common::*;
    use std::fs;
    use voc_tools::{smart_resize, smart_resize_all, SmartResizeOutcome};

    #[test]
    fn test_equal_scale_writes_single_scaled_copy() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(&output).unwrap();
        let image = write_annotated_image(&input, "fox.png", 240, 320, &[("Fox", (20.0, 20.0, 100.0, 100.0))]);

        let outcome = smart_resize(&image, 480, 640, &output).unwrap();
        assert_eq!(outcome, SmartResizeOutcome::Written(1));

        let resized = image::open(output.join("fox.png")).unwrap();
        assert_eq!((resized.width(), resized.height()), (480, 640));
        let annotation = read_xml(&output.join("fox.xml"));
        assert_eq!(annotation.filename.as_deref(), Some("fox.png"));
        let size = annotation.size.clone().unwrap();
        assert_eq!((size.width, size.height), (480, 640));
        assert_eq!(
            object_boxes(&annotation),
            vec![("fox".to_string(), [40.0, 40.0, 200.0, 200.0])]
        );
    }

    #[test]
    fn test_wide_source_is_cropped_around_box() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(&output).unwrap();
        let image = write_annotated_image(&dir, "wide.png", 960, 320, &[("cat", (100.0, 40.0, 200.0, 200.0))]);

        let outcome = smart_resize(&image, 480, 640, &output).unwrap();
        assert_eq!(outcome, SmartResizeOutcome::Written(1));

        let resized = image::open(output.join("wide.png")).unwrap();
        assert_eq!((resized.width(), resized.height()), (480, 640));
        let annotation = read_xml(&output.join("wide.xml"));
        assert_eq!(
            object_boxes(&annotation),
            vec![("cat".to_string(), [140.0, 80.0, 340.0, 400.0])]
        );
    }

    #[test]
    fn test_oversized_box_produces_corner_crops_and_box_view() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(&output).unwrap();
        let image = write_annotated_image(&dir, "train.png", 960, 320, &[("train", (10.0, 10.0, 950.0, 310.0))]);

        let outcome = smart_resize(&image, 480, 640, &output).unwrap();
        assert_eq!(outcome, SmartResizeOutcome::Written(3));

        for stem in ["train", "train_1", "train_2"] {
            assert!(output.join(format!("{}.png", stem)).is_file(), "{} missing", stem);
            assert!(output.join(format!("{}.xml", stem)).is_file(), "{} missing", stem);
        }

        let left_top = read_xml(&output.join("train.xml"));
        assert_eq!(
            object_boxes(&left_top),
            vec![("train".to_string(), [20.0, 20.0, 480.0, 620.0])]
        );
        let right_bottom = read_xml(&output.join("train_1.xml"));
        assert_eq!(
            object_boxes(&right_bottom),
            vec![("train".to_string(), [0.0, 20.0, 460.0, 620.0])]
        );

        // Box-fit view is limited by the source height
        let fitted = image::open(output.join("train_2.png")).unwrap();
        assert_eq!((fitted.width(), fitted.height()), (480, 320));
    }

    #[test]
    fn test_multiple_small_boxes_get_zoomed_views() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(&output).unwrap();
        let image = write_annotated_image(
            &dir,
            "birds.png",
            480,
            640,
            &[
                ("bird", (100.0, 100.0, 140.0, 140.0)),
                ("bird", (300.0, 400.0, 340.0, 440.0)),
            ],
        );

        let outcome = smart_resize(&image, 480, 640, &output).unwrap();
        assert_eq!(outcome, SmartResizeOutcome::Written(3));

        let copy = read_xml(&output.join("birds.xml"));
        assert_eq!(copy.object.len(), 2);

        // First zoomed view: the box is centred and enlarged four times
        let zoomed = read_xml(&output.join("birds_1.xml"));
        assert!(zoomed
            .object
            .iter()
            .any(|o| o.bndbox.xmin == 160.0 && o.bndbox.xmax == 320.0));
        let zoomed_image = image::open(output.join("birds_1.png")).unwrap();
        assert_eq!((zoomed_image.width(), zoomed_image.height()), (480, 640));
    }

    #[test]
    fn test_missing_annotation_and_empty_annotation_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(&output).unwrap();

        let bare = dir.join("bare.png");
        write_image(&bare, 100, 100, &[]);
        assert_eq!(
            smart_resize(&bare, 480, 640, &output).unwrap(),
            SmartResizeOutcome::MissingAnnotation
        );

        let empty = write_annotated_image(&dir, "empty.png", 100, 100, &[]);
        assert_eq!(
            smart_resize(&empty, 480, 640, &output).unwrap(),
            SmartResizeOutcome::NoObjects
        );
        assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn test_smart_resize_all_mirrors_tree_and_counts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        write_annotated_image(&input.join("Cats"), "a.png", 240, 320, &[("cat", (20.0, 20.0, 100.0, 100.0))]);
        write_image(&input.join("Cats").join("b.png"), 240, 320, &[]);

        let stats = smart_resize_all(&input, &output, 480, 640).unwrap();
        assert_eq!(stats.total_files_processed, 2);
        assert_eq!(stats.successful_files, 1);
        assert_eq!(stats.outputs_written, 1);
        assert_eq!(stats.skipped_missing_annotation, 1);
        assert_eq!(stats.failed_files, 0);
        assert!(output.join("Cats").join("a.png").is_file());
        assert!(output.join("Cats").join("a.xml").is_file());
        assert!(!output.join("Cats").join("b.png").exists());
    }

    #[test]
    fn test_smart_resize_all_in_place() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("all");
        write_annotated_image(&root, "a.png", 240, 320, &[("cat", (20.0, 20.0, 100.0, 100.0))]);

        let stats = smart_resize_all(&root, &root, 480, 640).unwrap();
        assert_eq!(stats.outputs_written, 1);
        let resized = image::open(root.join("a.png")).unwrap();
        assert_eq!((resized.width(), resized.height()), (480, 640));
    }

    #[test]
    fn test_tall_source_is_cropped_around_box() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(&output).unwrap();
        let image = write_annotated_image(&dir, "tall.png", 480, 1280, &[("dog", (100.0, 800.0, 300.0, 1000.0))]);

        let outcome = smart_resize(&image, 480, 640, &output).unwrap();
        assert_eq!(outcome, SmartResizeOutcome::Written(1));

        let resized = image::open(output.join("tall.png")).unwrap();
        assert_eq!((resized.width(), resized.height()), (480, 640));
        assert_eq!(
            object_boxes(&read_xml(&output.join("tall.xml"))),
            vec![("dog".to_string(), [100.0, 220.0, 300.0, 420.0])]
        );
    }

    #[test]
    fn test_multiple_boxes_cropped_around_union_then_zoomed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(&output).unwrap();
        let image = write_annotated_image(
            &dir,
            "multi.png",
            960,
            320,
            &[("a", (100.0, 40.0, 140.0, 80.0)), ("b", (200.0, 200.0, 240.0, 240.0))],
        );

        let outcome = smart_resize(&image, 480, 640, &output).unwrap();
        assert_eq!(outcome, SmartResizeOutcome::Written(3));

        assert_eq!(
            object_boxes(&read_xml(&output.join("multi.xml"))),
            vec![
                ("a".to_string(), [100.0, 80.0, 180.0, 160.0]),
                ("b".to_string(), [300.0, 400.0, 380.0, 480.0]),
            ]
        );
        // Each small box gets its own view, enlarged six times around its centre
        assert_eq!(
            object_boxes(&read_xml(&output.join("multi_1.xml"))),
            vec![("a".to_string(), [120.0, 200.0, 360.0, 440.0])]
        );
        assert_eq!(
            object_boxes(&read_xml(&output.join("multi_2.xml"))),
            vec![("b".to_string(), [120.0, 200.0, 360.0, 440.0])]
        );
    }

    #[test]
    fn test_multiple_boxes_corner_crops_keep_small_boxes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(&output).unwrap();
        let image = write_annotated_image(
            &dir,
            "pair.png",
            960,
            320,
            &[("a", (20.0, 40.0, 60.0, 80.0)), ("b", (700.0, 40.0, 900.0, 200.0))],
        );

        let outcome = smart_resize(&image, 480, 640, &output).unwrap();
        assert_eq!(outcome, SmartResizeOutcome::Written(4));

        // 80 px wide, below the single-object minimum of 120 px
        assert_eq!(
            object_boxes(&read_xml(&output.join("pair.xml"))),
            vec![("a".to_string(), [40.0, 80.0, 120.0, 160.0])]
        );
        assert_eq!(
            object_boxes(&read_xml(&output.join("pair_1.xml"))),
            vec![("b".to_string(), [0.0, 80.0, 360.0, 400.0])]
        );
        assert_eq!(
            object_boxes(&read_xml(&output.join("pair_2.xml"))),
            vec![("a".to_string(), [120.0, 200.0, 360.0, 440.0])]
        );
        assert_eq!(
            object_boxes(&read_xml(&output.join("pair_3.xml"))),
            vec![("b".to_string(), [40.0, 160.0, 440.0, 480.0])]
        );
    }

    #[test]
    fn test_box_touching_border_gets_no_zoomed_view() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(&output).unwrap();
        let image = write_annotated_image(
            &dir,
            "edge.png",
            480,
            640,
            &[("a", (0.0, 100.0, 40.0, 140.0)), ("b", (300.0, 400.0, 340.0, 440.0))],
        );

        let outcome = smart_resize(&image, 480, 640, &output).unwrap();
        assert_eq!(outcome, SmartResizeOutcome::Written(2));
        assert_eq!(
            object_boxes(&read_xml(&output.join("edge_1.xml"))),
            vec![("b".to_string(), [160.0, 240.0, 320.0, 400.0])]
        );
        assert!(!output.join("edge_2.png").exists());
    }

    #[test]
    fn test_flat_box_writes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(&output).unwrap();
        // Zero height: every corner crop drops it and the box-fit view is skipped
        let image = write_annotated_image(&dir, "line.png", 960, 320, &[("wire", (10.0, 100.0, 950.0, 100.0))]);

        let outcome = smart_resize(&image, 480, 640, &output).unwrap();
        assert_eq!(outcome, SmartResizeOutcome::Written(0));
        assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn test_smart_resize_all_into_parent_of_input() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data = temp_dir.path().join("data");
        let input = data.join("in");
        write_annotated_image(&input, "a.png", 240, 320, &[("cat", (20.0, 20.0, 100.0, 100.0))]);

        let stats = smart_resize_all(&input, &data, 480, 640).unwrap();
        assert_eq!(stats.total_files_processed, 1);
        assert_eq!(stats.outputs_written, 1);
        assert!(data.join("a.png").is_file());
        assert!(data.join("a.xml").is_file());
    }

    #[test]
    fn test_smart_resize_all_skips_output_nested_in_input() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("data");
        let output = input.join("resized");
        write_annotated_image(&input, "a.png", 240, 320, &[("cat", (20.0, 20.0, 100.0, 100.0))]);
        write_annotated_image(&output, "old.png", 480, 640, &[("cat", (40.0, 40.0, 200.0, 200.0))]);

        let stats = smart_resize_all(&input, &output, 480, 640).unwrap();
        assert_eq!(stats.total_files_processed, 1);
        assert!(output.join("a.png").is_file());
    }
}
