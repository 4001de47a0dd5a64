mod common;

#[cfg(test)]
mod tests {
    use super::common::*;
    use std::fs;
    use voc_tools::coco::convert_coco_dir;
    use voc_tools::config::{ResizeMode, TransferMode};
    use voc_tools::dedup::{find_duplicates, remove_duplicates};
    use voc_tools::group::group_files_per_class;
    use voc_tools::images::convert_images;
    use voc_tools::labels::{change_label, check_classes, remove_label};
    use voc_tools::layout::to_pascal_voc_layout;
    use voc_tools::prepare::{available_classes, prepare_dataset, PrepareConfig};
    use voc_tools::rename::{capitalize_folder_names, rename_images};
    use voc_tools::resize::resize_all;
    use voc_tools::split::{distribute_images, SplitDirs, SplitRatios};
    use voc_tools::utils::collect_image_files;
    use voc_tools::yolo::convert_yolo_dir;

    #[test]
    fn test_coco_to_voc() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("json");
        let output = temp_dir.path().join("voc");
        fs::create_dir_all(&input).unwrap();
        let coco = r#"{
            "info": {"description": "test"},
            "images": [
                {"id": 1, "file_name": "a.jpg", "width": 100, "height": 80, "license": 1},
                {"id": 2, "file_name": "b.jpg", "width": 100, "height": 80}
            ],
            "categories": [{"id": 1, "name": "dog", "supercategory": "animal"}],
            "annotations": [
                {"id": 1, "image_id": 1, "category_id": 1, "bbox": [10.7, 20.2, 30.5, 40.9], "area": 1.0, "iscrowd": 0},
                {"id": 2, "image_id": 1, "category_id": 99, "bbox": [1, 1, 5, 5]},
                {"id": 3, "image_id": 2, "category_id": 1, "segmentation": [[1, 2, 3, 4]]}
            ]
        }"#;
        fs::write(input.join("instances.json"), coco).unwrap();

        let stats = convert_coco_dir(&input, &output).unwrap();
        assert_eq!(stats.files_written, 1);
        assert_eq!(stats.errors, 1);

        let annotation = read_xml(&output.join("instances").join("a.xml"));
        assert_eq!(annotation.folder.as_deref(), Some("instances"));
        assert_eq!(annotation.filename.as_deref(), Some("a.jpg"));
        assert_eq!(
            object_boxes(&annotation),
            vec![("dog".to_string(), [10.0, 20.0, 41.0, 61.0])]
        );
        assert!(!output.join("instances").join("b.xml").exists());
    }

    #[test]
    fn test_yolo_to_voc() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("Foxes");
        write_image(&root.join("a.png"), 200, 100, &[]);
        fs::create_dir_all(root.join("labels")).unwrap();
        fs::write(
            root.join("labels").join("a.txt"),
            "0 0.5 0.5 0.5 0.5\nRed Fox 10 20 110 90\n\n",
        )
        .unwrap();
        fs::write(root.join("labels").join("orphan.txt"), "0 0.5 0.5 0.1 0.1\n").unwrap();

        let classes = vec!["fox".to_string()];
        let (stats, found) = convert_yolo_dir(&root, &classes).unwrap();
        assert_eq!(stats.files_written, 1);
        assert_eq!(found, vec!["fox".to_string(), "red_fox".to_string()]);

        let annotation = read_xml(&root.join("a.xml"));
        assert_eq!(annotation.folder.as_deref(), Some("XML"));
        assert_eq!(annotation.filename.as_deref(), Some("a.png"));
        assert_eq!(
            object_boxes(&annotation),
            vec![
                ("fox".to_string(), [50.0, 25.0, 150.0, 75.0]),
                ("red_fox".to_string(), [10.0, 20.0, 110.0, 90.0]),
            ]
        );
    }

    #[test]
    fn test_change_check_and_remove_labels() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_annotated_image(root, "a.png", 50, 50, &[("Cat", (1.0, 1.0, 20.0, 20.0)), ("dog", (5.0, 5.0, 30.0, 30.0))]);
        write_annotated_image(root, "b.png", 50, 50, &[("dog", (1.0, 1.0, 20.0, 20.0))]);

        let report = check_classes(root).unwrap();
        assert_eq!(report.files_checked, 2);
        assert_eq!(report.files_updated, 1);
        assert_eq!(report.classes, vec!["cat".to_string(), "dog".to_string()]);
        assert_eq!(read_xml(&root.join("a.xml")).object[0].name, "cat");

        let removal = remove_label(root, "DOG").unwrap();
        assert_eq!(removal.files_processed, 2);
        assert_eq!(removal.objects_removed, 2);
        assert_eq!(removal.files_deleted, 1);
        assert!(!root.join("b.xml").exists());
        assert!(root.join("b.png").exists());
        assert_eq!(read_xml(&root.join("a.xml")).object.len(), 1);

        assert_eq!(change_label(root, "Bird").unwrap(), 1);
        assert_eq!(read_xml(&root.join("a.xml")).classes(), vec!["bird".to_string()]);
        assert!(change_label(root, "  ").is_err());
    }

    #[test]
    fn test_group_files_per_class() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("mixed");
        write_annotated_image(&root, "a.png", 50, 50, &[("Cat", (1.0, 1.0, 20.0, 20.0))]);
        write_annotated_image(&root, "b.png", 50, 50, &[("cat", (1.0, 1.0, 20.0, 20.0)), ("dog", (5.0, 5.0, 30.0, 30.0))]);
        write_annotated_image(&root.join("Dog"), "c.png", 50, 50, &[("dog", (1.0, 1.0, 20.0, 20.0))]);

        let report = group_files_per_class(&root).unwrap();
        assert_eq!(report.files_grouped, 1);
        assert_eq!(report.multi_class_files.len(), 1);

        let moved = root.join("Cat");
        assert!(moved.join("a.png").is_file());
        let annotation = read_xml(&moved.join("a.xml"));
        assert_eq!(annotation.folder.as_deref(), Some("Cat"));
        assert_eq!(annotation.object[0].name, "cat");
        assert!(!root.join("a.png").exists());
        assert!(root.join("b.png").is_file());
        assert!(root.join("Dog").join("c.png").is_file());
        assert!(!root.join("Dog").join("Dog").exists());
    }

    #[test]
    fn test_group_keeps_annotation_when_image_cannot_move() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("mixed");
        write_annotated_image(&root, "a.png", 50, 50, &[("cat", (1.0, 1.0, 20.0, 20.0))]);
        // A non-empty folder in the way of the image
        let blocker = root.join("Cat").join("a.png");
        fs::create_dir_all(&blocker).unwrap();
        fs::write(blocker.join("keep.txt"), "x").unwrap();

        let report = group_files_per_class(&root).unwrap();
        assert_eq!(report.files_grouped, 0);
        assert!(root.join("a.png").is_file());
        assert!(root.join("a.xml").is_file());
        assert!(!root.join("Cat").join("a.xml").exists());
    }

    #[test]
    fn test_remove_duplicates_keeps_annotated_copy() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let vertical = [(0.0, 0.0, 32.0, 64.0)];
        let horizontal = [(0.0, 0.0, 64.0, 32.0)];
        write_image(&root.join("a.png"), 64, 64, &vertical);
        write_annotated_image(root, "b.png", 64, 64, &[("x", vertical[0])]);
        write_image(&root.join("c.png"), 64, 64, &horizontal);

        let images = collect_image_files(root);
        let groups = find_duplicates(&images);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);

        assert_eq!(remove_duplicates(root).unwrap(), 1);
        assert!(!root.join("a.png").exists());
        assert!(root.join("b.png").is_file());
        assert!(root.join("b.xml").is_file());
        assert!(root.join("c.png").is_file());
    }

    #[test]
    fn test_convert_images_to_jpg() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_annotated_image(root, "a.png", 40, 40, &[("Cat", (1.0, 1.0, 20.0, 20.0))]);
        write_annotated_image(root, "b.jpeg", 40, 40, &[("dog", (1.0, 1.0, 20.0, 20.0))]);

        let (converted, renamed) = convert_images(root).unwrap();
        assert_eq!((converted, renamed), (1, 1));
        assert!(!root.join("a.png").exists());
        assert!(root.join("a.jpg").is_file());
        assert!(root.join("b.jpg").is_file());

        let annotation = read_xml(&root.join("a.xml"));
        assert_eq!(annotation.filename.as_deref(), Some("a.jpg"));
        assert_eq!(annotation.object[0].name, "cat");
        assert_eq!(read_xml(&root.join("b.xml")).filename.as_deref(), Some("b.jpg"));
    }

    #[test]
    fn test_rename_images_and_capitalize_folders() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("red fox");
        write_annotated_image(&root.join("baby FOXES"), "img.png", 40, 40, &[("Fox", (1.0, 1.0, 20.0, 20.0))]);

        assert_eq!(capitalize_folder_names(temp_dir.path()).unwrap(), 2);
        let folder = temp_dir.path().join("Red_fox").join("Baby_foxes");
        assert!(folder.join("img.png").is_file());

        assert_eq!(rename_images(&folder).unwrap(), 1);
        let images = collect_image_files(&folder);
        assert_eq!(images.len(), 1);
        let stem = images[0].file_stem().unwrap().to_string_lossy().into_owned();
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));

        let annotation = read_xml(&images[0].with_extension("xml"));
        assert_eq!(annotation.folder.as_deref(), Some("XML"));
        assert_eq!(annotation.filename, Some(format!("{}.png", stem)));
        assert_eq!(annotation.object[0].name, "fox");
        assert!(!folder.join("img.xml").exists());
    }

    #[test]
    fn test_resize_crop_mode_writes_two_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        write_annotated_image(
            &root,
            "wide.png",
            640,
            320,
            &[("Left", (10.0, 10.0, 60.0, 60.0)), ("right", (400.0, 100.0, 500.0, 200.0))],
        );

        let stats = resize_all(&root, &output, 320, 320, ResizeMode::Crop).unwrap();
        assert_eq!(stats.outputs_written, 2);

        let far = read_xml(&output.join("wide_1.xml"));
        assert_eq!(
            object_boxes(&far),
            vec![("right".to_string(), [80.0, 100.0, 180.0, 200.0])]
        );
        let near = read_xml(&output.join("wide.xml"));
        assert_eq!(
            object_boxes(&near),
            vec![("left".to_string(), [10.0, 10.0, 60.0, 60.0])]
        );
        let image = image::open(output.join("wide_1.png")).unwrap();
        assert_eq!((image.width(), image.height()), (320, 320));
    }

    #[test]
    fn test_resize_size_mode_scales_boxes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("data");
        write_annotated_image(&root, "a.png", 640, 640, &[("cat", (100.0, 200.0, 300.0, 400.0))]);

        let stats = resize_all(&root, &root, 320, 160, ResizeMode::Size).unwrap();
        assert_eq!(stats.successful_files, 1);
        let annotation = read_xml(&root.join("a.xml"));
        assert_eq!(
            object_boxes(&annotation),
            vec![("cat".to_string(), [50.0, 50.0, 150.0, 100.0])]
        );
        let size = annotation.size.unwrap();
        assert_eq!((size.width, size.height), (320, 160));
    }

    #[test]
    fn test_resize_into_parent_of_input() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data = temp_dir.path().join("data");
        let input = data.join("in");
        write_annotated_image(&input, "a.png", 640, 640, &[("cat", (100.0, 200.0, 300.0, 400.0))]);

        let stats = resize_all(&input, &data, 320, 320, ResizeMode::Size).unwrap();
        assert_eq!(stats.total_files_processed, 1);
        assert_eq!(stats.successful_files, 1);
        assert!(data.join("a.png").is_file());
        assert_eq!(
            object_boxes(&read_xml(&data.join("a.xml"))),
            vec![("cat".to_string(), [50.0, 100.0, 150.0, 200.0])]
        );
    }

    #[test]
    fn test_resize_skips_output_nested_in_input() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("data");
        let output = input.join("resized");
        write_annotated_image(&input, "a.png", 640, 640, &[("cat", (100.0, 200.0, 300.0, 400.0))]);
        write_annotated_image(&output, "old.png", 320, 320, &[("cat", (10.0, 10.0, 50.0, 50.0))]);

        let stats = resize_all(&input, &output, 320, 320, ResizeMode::Size).unwrap();
        assert_eq!(stats.total_files_processed, 1);
        assert!(output.join("a.png").is_file());
    }

    #[test]
    fn test_split_and_layout() {
        let temp_dir = tempfile::tempdir().unwrap();
        let all = temp_dir.path().join("all");
        for i in 0..10 {
            write_annotated_image(&all, &format!("img{}.png", i), 20, 20, &[("cat", (1.0, 1.0, 15.0, 15.0))]);
        }
        let images = collect_image_files(&all);
        let dirs = SplitDirs::new(
            temp_dir.path().join("train"),
            temp_dir.path().join("validation"),
            temp_dir.path().join("test"),
        );

        let counts = distribute_images(images, &dirs, SplitRatios::default(), TransferMode::Copy, 42).unwrap();
        assert_eq!((counts.train, counts.val, counts.test), (8, 1, 1));
        assert_eq!(collect_image_files(&all).len(), 10);

        let train_images = collect_image_files(&dirs.train);
        assert_eq!(train_images.len(), 8);
        let name = train_images[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("all_img"));
        let annotation = read_xml(&train_images[0].with_extension("xml"));
        assert_eq!(annotation.filename, Some(name));

        let output = temp_dir.path().join("voc");
        let moved = to_pascal_voc_layout(&dirs.train, &dirs.val, &dirs.test, &output, TransferMode::Move).unwrap();
        assert_eq!(moved, 20);
        assert_eq!(collect_image_files(&output.join("train").join("images")).len(), 8);
        assert_eq!(
            fs::read_dir(output.join("validation").join("Annotations")).unwrap().count(),
            1
        );
        assert_eq!(collect_image_files(&dirs.train).len(), 0);
    }

    #[test]
    fn test_prepare_dataset_pipeline() {
        let temp_dir = tempfile::tempdir().unwrap();
        let datasets = temp_dir.path().join("datasets");
        for i in 0..5 {
            write_annotated_image(&datasets.join("Cat"), &format!("cat{}.jpg", i), 64, 64, &[("cat", (8.0, 8.0, 40.0, 40.0))]);
        }
        write_annotated_image(&datasets.join("Dog"), "dog0.jpg", 64, 64, &[("dog", (8.0, 8.0, 40.0, 40.0))]);
        fs::create_dir_all(datasets.join("Cat").join(".cache")).unwrap();

        let classes = available_classes(&datasets);
        let names: Vec<&str> = classes.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["cat", "dog"]);

        let config = PrepareConfig {
            dataset_root: datasets.clone(),
            labels: vec!["Cat".to_string()],
            limit_per_label: 3,
            temp_dir: temp_dir.path().join("temp"),
            target_width: 64,
            target_height: 64,
            ratios: SplitRatios::default(),
            seed: 7,
        };
        let prepared = prepare_dataset(&config).unwrap();
        assert_eq!(prepared.counts.train + prepared.counts.val + prepared.counts.test, 3);
        assert_eq!(prepared.counts.train, 2);
        assert_eq!(fs::read_to_string(&prepared.labelmap).unwrap(), "cat\n");
        assert_eq!(collect_image_files(&prepared.dirs.train).len(), 2);
    }
}
